//! Report folder command handlers.

use std::sync::Arc;

use bytesize::ByteSize;
use tabled::Tabled;

use rwtool_core::ReportFile;
use rwtool_core::projection::{StatusFilter, project};

use crate::cli::{FoldersArgs, FoldersCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::CommandContext;

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "Folder")]
    folder: String,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
}

fn file_row(f: &Arc<ReportFile>) -> FileRow {
    FileRow {
        folder: f.folder.clone(),
        file: f.file_name.clone(),
        size: f.size.map_or_else(|| "-".into(), |s| ByteSize(s).to_string()),
        modified: output::or_dash(f.last_modified.as_deref()),
    }
}

fn file_path(f: &Arc<ReportFile>) -> String {
    format!("{}/{}", f.folder, f.file_name)
}

pub async fn handle(
    args: FoldersArgs,
    ctx: &CommandContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let gw = &ctx.gateways.folders;

    let files = match args.command {
        FoldersCommand::List => {
            let folders = gw.list_folders().await?;
            super::groups::print_folders(global, &folders);
            return Ok(());
        }
        FoldersCommand::Files { folder } => {
            let files = gw
                .folder_files(folder.clone())
                .await
                .map_err(|e| CliError::from(e).for_resource("folder", &folder, "folders list"))?;
            files.into_iter().map(Arc::new).collect::<Vec<_>>()
        }
        FoldersCommand::UserFiles { email, filter } => {
            let email = match email {
                Some(email) => email.trim().to_owned(),
                None => ctx.email()?.to_owned(),
            };
            let files: Vec<_> = gw.user_files(email).await?.into_iter().map(Arc::new).collect();
            project(
                &files,
                filter.search.as_deref().unwrap_or_default(),
                &StatusFilter::parse(filter.status.as_deref()),
            )
        }
    };

    let out = output::render_list(&global.output, &files, file_row, file_path);
    output::print_output(&out, global.quiet);
    Ok(())
}
