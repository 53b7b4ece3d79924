mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rwtool_core::Gateways;

use crate::cli::{Cli, Command};
use crate::commands::CommandContext;
use crate::error::{CliError, exit_code};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    let code = match run(cli).await {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Local-only commands never build a client.
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "rwtool", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let (profile, console) = config::build_console_config(&cli.global)?;
            let server = console.url.to_string();
            let gateways = Gateways::http(console.client()?);
            let ctx = CommandContext::new(gateways, console.session, profile, server, &cli.global);

            tracing::debug!(command = ?cmd, server = %ctx.server, "dispatching command");
            commands::dispatch(cmd, &ctx, &cli.global)
                .await
                .map_err(|e| e.in_context(&ctx.profile, &ctx.server))
        }
    }
}
