//! CLI configuration: thin wrapper around `rwtool_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (`--api-url`, `--timeout`, `--as-email`, ...).

use std::time::Duration;

use rwtool_core::{ConsoleConfig, Role, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use rwtool_config::{Config, Profile, config_path, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// The named profile, or an empty default one when only the built-in
/// `default` profile is asked for and none is configured.
pub fn profile_or_default(config: &Config, name: &str) -> Result<Profile, CliError> {
    match config.profile(Some(name)) {
        Ok((_, profile)) => Ok(profile.clone()),
        Err(_) if name == "default" => Ok(Profile::default()),
        Err(err) => Err(crate::error::unknown_profile(err, config)),
    }
}

/// Translate a `Profile` + global flags into a `ConsoleConfig`.
///
/// Flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    default_timeout: u64,
) -> Result<ConsoleConfig, CliError> {
    let url_str = global.api_url.as_deref().unwrap_or(&profile.api_url);
    let url: url::Url = url_str.parse().map_err(|_| CliError::InvalidArgument {
        field: "api_url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let session = resolve_session(profile, global)?;
    let mut config = ConsoleConfig::new(url, session);
    config.timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(default_timeout),
    );
    config.token = rwtool_config::resolve_token(profile, profile_name);
    config.notices = profile.notice_timings();
    Ok(config)
}

/// Identity from the profile with `--as-*` flags applied on top.
pub fn resolve_session(profile: &Profile, global: &GlobalOpts) -> Result<Session, CliError> {
    let mut session = profile.session()?;
    if let Some(email) = &global.as_email {
        email.trim().clone_into(&mut session.email);
    }
    if let Some(name) = &global.as_name {
        name.trim().clone_into(&mut session.name);
    }
    if let Some(dept) = &global.as_department {
        session.department = Some(dept.trim().to_owned());
    }
    if let Some(role) = &global.as_role {
        session.role = parse_role(role)?;
    }
    Ok(session)
}

pub fn parse_role(raw: &str) -> Result<Role, CliError> {
    raw.trim().parse().map_err(|_| CliError::InvalidArgument {
        field: "role".into(),
        reason: format!("expected ADMIN, OPS or USER, got '{raw}'"),
    })
}

/// Load config and build the `ConsoleConfig` for the active profile.
pub fn build_console_config(global: &GlobalOpts) -> Result<(String, ConsoleConfig), CliError> {
    let cfg = load_config_or_default();
    let name = active_profile_name(global, &cfg);
    let profile = profile_or_default(&cfg, &name)?;
    let console = resolve_profile(&profile, &name, global, cfg.defaults.timeout)?;
    Ok((name, console))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["rwtool"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["domains", "list"]);
        Cli::try_parse_from(argv).map(|c| c.global).expect("parse")
    }

    #[test]
    fn flags_override_profile_identity() {
        let mut profile = Profile::new("http://reports:9090");
        profile.email = Some("ann@corp.com".into());
        profile.role = Some("USER".into());

        let opts = global(&["--as-email", "bob@corp.com", "--as-role", "ops"]);
        let session = resolve_session(&profile, &opts).expect("session");
        assert_eq!(session.email, "bob@corp.com");
        assert_eq!(session.role, Role::Ops);
    }

    #[test]
    fn api_url_flag_wins() {
        let profile = Profile::new("http://reports:9090");
        let opts = global(&["--api-url", "http://other:1234", "--timeout", "5"]);
        let config = resolve_profile(&profile, "default", &opts, 30).expect("config");
        assert_eq!(config.url.as_str(), "http://other:1234/");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_url_is_a_usage_error() {
        let profile = Profile::new("not a url");
        let err = resolve_profile(&profile, "default", &global(&[]), 30).expect_err("invalid");
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }

    #[test]
    fn missing_default_profile_falls_back() {
        let cfg = Config::default();
        let profile = profile_or_default(&cfg, "default").expect("default");
        assert_eq!(profile.api_url, rwtool_config::DEFAULT_API_URL);
        assert!(profile_or_default(&cfg, "staging").is_err());
    }
}
