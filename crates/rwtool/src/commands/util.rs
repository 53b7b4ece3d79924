//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use rwtool_core::{ReportRef, Session};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Refuses outright when stdin is not a terminal, so scripts must opt in
/// with `--yes`.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<(), CliError> {
    if yes_flag {
        return Ok(());
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    if confirmed {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

/// The session email, or an error naming how to set one.
pub fn require_email<'a>(session: &'a Session, profile: &str) -> Result<&'a str, CliError> {
    if session.email.trim().is_empty() {
        return Err(CliError::NoIdentity {
            profile: profile.into(),
        });
    }
    Ok(session.email.as_str())
}

/// Parse `FOLDER/FILE`. The last `/` separates the two, so folders may
/// themselves be nested paths.
pub fn parse_report_path(raw: &str) -> Result<ReportRef, CliError> {
    raw.rsplit_once('/')
        .map(|(folder, file)| ReportRef::new(folder, file))
        .filter(ReportRef::is_complete)
        .ok_or_else(|| CliError::InvalidArgument {
            field: "report".into(),
            reason: format!("expected FOLDER/FILE, got '{raw}'"),
        })
}

/// Spinner on stderr while a download runs. Hidden in quiet mode.
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Write downloaded bytes, defaulting the path to `fallback_name`.
pub fn write_download(
    bytes: &[u8],
    out: Option<PathBuf>,
    fallback_name: &str,
) -> Result<PathBuf, CliError> {
    let path = out.unwrap_or_else(|| {
        Path::new(fallback_name)
            .file_name()
            .map_or_else(|| PathBuf::from("report"), PathBuf::from)
    });
    std::fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_path_splits_on_last_slash() {
        let r = parse_report_path("finance/q1/summary.pdf").expect("valid");
        assert_eq!(r.folder, "finance/q1");
        assert_eq!(r.file_name, "summary.pdf");
    }

    #[test]
    fn report_path_needs_both_parts() {
        assert!(parse_report_path("summary.pdf").is_err());
        assert!(parse_report_path("finance/").is_err());
        assert!(parse_report_path("/summary.pdf").is_err());
    }

    #[test]
    fn blank_identity_is_rejected() {
        let session = Session::new("  ", "", rwtool_core::Role::User);
        assert!(matches!(
            require_email(&session, "default"),
            Err(CliError::NoIdentity { .. })
        ));
    }

    #[test]
    fn download_writes_to_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("out.pdf");
        let path = write_download(b"%PDF", Some(target.clone()), "ignored.pdf").expect("write");
        assert_eq!(path, target);
        assert_eq!(std::fs::read(&target).expect("read"), b"%PDF");
    }
}
