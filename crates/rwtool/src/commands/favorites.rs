//! Favorite report command handlers.

use tabled::Tabled;

use rwtool_core::{ReportRef, validation};

use crate::cli::{FavoritesArgs, FavoritesCommand, GlobalOpts, ReportArg};
use crate::error::CliError;
use crate::output;

use super::CommandContext;

#[derive(Tabled)]
struct FavoriteRow {
    #[tabled(rename = "Folder")]
    folder: String,
    #[tabled(rename = "File")]
    file: String,
}

fn reference(arg: ReportArg) -> Result<ReportRef, CliError> {
    let report = ReportRef::new(arg.folder.trim(), arg.file.trim());
    validation::report_ref(&report)?;
    Ok(report)
}

pub async fn handle(
    args: FavoritesArgs,
    ctx: &CommandContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let gw = &ctx.gateways.reports;
    let user = ctx.email()?.to_owned();

    match args.command {
        FavoritesCommand::List => {
            let favorites = gw.favorites(user).await?;
            let out = output::render_list(
                &global.output,
                &favorites,
                |r| FavoriteRow {
                    folder: r.folder.clone(),
                    file: r.file_name.clone(),
                },
                |r| format!("{}/{}", r.folder, r.file_name),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
        FavoritesCommand::Add(arg) => {
            gw.add_favorite(user, reference(arg)?).await?;
            ctx.notice(global, "Added to favorites");
            Ok(())
        }
        FavoritesCommand::Remove(arg) => {
            gw.remove_favorite(user, reference(arg)?).await?;
            ctx.notice(global, "Removed from favorites");
            Ok(())
        }
    }
}
