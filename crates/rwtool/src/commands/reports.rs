//! Report viewing and download handlers.

use bytes::Bytes;
use bytesize::ByteSize;
use serde::Serialize;

use rwtool_core::{ReportMetadata, ReportRef, validation};

use crate::cli::{GlobalOpts, ReportArg, ReportsArgs, ReportsCommand};
use crate::error::CliError;
use crate::output;

use super::CommandContext;
use super::util;

fn reference(arg: &ReportArg) -> Result<ReportRef, CliError> {
    let report = ReportRef::new(arg.folder.trim(), arg.file.trim());
    validation::report_ref(&report)?;
    Ok(report)
}

fn not_found(err: CliError, report: &ReportRef) -> CliError {
    err.for_resource(
        "report",
        &format!("{}/{}", report.folder, report.file_name),
        "folders user-files",
    )
}

fn metadata_detail(m: &ReportMetadata) -> String {
    output::detail_lines(&[
        ("Folder", m.reference.folder.clone()),
        ("File", m.reference.file_name.clone()),
        ("Size", ByteSize(m.size).to_string()),
        ("Type", output::or_dash(m.content_type.as_deref())),
        ("Exists", m.exists.to_string()),
    ])
}

#[derive(Serialize)]
struct ReportUrls {
    preview: String,
    download: String,
}

#[derive(Serialize)]
struct Saved {
    path: String,
    bytes: usize,
}

fn print_saved(global: &GlobalOpts, ctx: &CommandContext, path: &std::path::Path, bytes: &Bytes) {
    let saved = Saved {
        path: path.display().to_string(),
        bytes: bytes.len(),
    };
    ctx.notice(
        global,
        &format!(
            "Saved {} ({})",
            saved.path,
            ByteSize(u64::try_from(saved.bytes).unwrap_or(u64::MAX))
        ),
    );
    if !matches!(global.output, crate::cli::OutputFormat::Table) {
        let out = output::render_single(&global.output, &saved, |_| String::new(), |s| s.path.clone());
        output::print_output(&out, global.quiet);
    }
}

pub async fn handle(
    args: ReportsArgs,
    ctx: &CommandContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let gw = &ctx.gateways.reports;

    match args.command {
        ReportsCommand::Metadata(arg) => {
            let report = reference(&arg)?;
            let meta = gw
                .metadata(report.clone())
                .await
                .map_err(|e| not_found(e.into(), &report))?;
            let out = output::render_single(&global.output, &meta, metadata_detail, |m| {
                m.reference.file_name.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReportsCommand::Urls(arg) => {
            let report = reference(&arg)?;
            let urls = ReportUrls {
                preview: gw.preview_url(&report)?.to_string(),
                download: gw.download_url(&report)?.to_string(),
            };
            let out = output::render_single(
                &global.output,
                &urls,
                |u| output::detail_lines(&[("Preview", u.preview.clone()), ("Download", u.download.clone())]),
                |u| u.download.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReportsCommand::Preview { report, out } => {
            let report = reference(&report)?;
            let bar = util::spinner(format!("Fetching preview of {}", report.file_name), global.quiet);
            let result = gw.preview(report.clone()).await;
            bar.finish_and_clear();
            let bytes = result.map_err(|e| not_found(e.into(), &report))?;
            let path = util::write_download(&bytes, out, &report.file_name)?;
            print_saved(global, ctx, &path, &bytes);
            Ok(())
        }

        ReportsCommand::Download { report, out } => {
            let report = reference(&report)?;
            let bar = util::spinner(format!("Downloading {}", report.file_name), global.quiet);
            let result = gw.download(report.clone()).await;
            bar.finish_and_clear();
            let bytes = result.map_err(|e| not_found(e.into(), &report))?;
            let path = util::write_download(&bytes, out, &report.file_name)?;
            print_saved(global, ctx, &path, &bytes);
            Ok(())
        }

        ReportsCommand::Batch {
            reports,
            zip_name,
            out,
        } => {
            let refs = reports
                .iter()
                .map(|raw| util::parse_report_path(raw))
                .collect::<Result<Vec<_>, _>>()?;
            let bar = util::spinner(format!("Downloading {} reports", refs.len()), global.quiet);
            let result = gw.download_batch(refs, zip_name.clone()).await;
            bar.finish_and_clear();
            let bytes = result?;
            let path = util::write_download(&bytes, out, &zip_name)?;
            print_saved(global, ctx, &path, &bytes);
            Ok(())
        }

        ReportsCommand::Presign { id, report } => {
            let report = reference(&report)?;
            let user = ctx.email()?.to_owned();
            let link = gw
                .presign(id, user, report.clone())
                .await
                .map_err(|e| not_found(e.into(), &report))?;
            let out = output::render_single(&global.output, &link, String::clone, String::clone);
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
