//! `rwtool-tui`: terminal console for the report-distribution platform.
//!
//! Built on [ratatui](https://ratatui.rs) over the `rwtool-core`
//! view-models. Screens are navigable via number keys (1-7): Dashboard,
//! Domains, Approvals, Groups, Catalog, My Subscriptions and Reports.
//!
//! Logs are written to a file (default `/tmp/rwtool-tui.log`) to avoid
//! corrupting the terminal UI. A background data bridge turns view-model
//! changes into redraws.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use rwtool_config::{Profile, load_config_or_default, profile_to_console_config};
use rwtool_core::{ConsoleConfig, Gateways};

use crate::app::App;
use crate::screens::ViewModels;

/// Terminal console for report domains, subscriptions and folder access.
#[derive(Parser, Debug)]
#[command(name = "rwtool-tui", version, about)]
struct Cli {
    /// Config profile to use (defaults to the configured default)
    #[arg(short = 'p', long, env = "RWTOOL_PROFILE")]
    profile: Option<String>,

    /// Server URL, overriding the profile (e.g. http://localhost:8080)
    #[arg(short = 'u', long, env = "RWTOOL_API_URL")]
    api_url: Option<String>,

    /// Directory downloaded reports are written to
    #[arg(short = 'd', long, default_value = ".")]
    download_dir: PathBuf,

    /// Log file path (defaults to /tmp/rwtool-tui.log)
    #[arg(long, default_value = "/tmp/rwtool-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; stdout belongs to the terminal UI. Hold the guard
/// for the lifetime of the app so logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("rwtool_tui={log_level},rwtool_core={log_level}"))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("rwtool-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the profile and apply the `--api-url` override.
///
/// Without a config file the built-in `default` profile is used.
fn build_console_config(cli: &Cli) -> Result<ConsoleConfig> {
    let config = load_config_or_default();
    let name = cli
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned());

    let mut profile = match config.profile(Some(name.as_str())) {
        Ok((_, profile)) => profile.clone(),
        Err(_) if name == "default" => Profile::default(),
        Err(err) => return Err(err).wrap_err_with(|| format!("profile '{name}'")),
    };
    if let Some(url) = &cli.api_url {
        profile.api_url.clone_from(url);
    }

    profile_to_console_config(&profile, &name).wrap_err("invalid console configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let console = build_console_config(&cli)?;
    let server = console.url.to_string();
    info!(server = %server, user = %console.session.email, role = %console.session.role, "starting rwtool-tui");

    let gateways = Gateways::http(console.client()?);
    let vms = ViewModels::new(&gateways, &console.session, console.notices);

    let mut app = App::new(vms, console.session, server, cli.download_dir);
    app.run().await
}
