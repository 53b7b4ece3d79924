//! Shared configuration for the rwtool CLI and TUI.
//!
//! TOML profiles, session token resolution (env + keyring + plaintext),
//! and translation to `rwtool_core::ConsoleConfig`. Both binaries depend
//! on this crate; the CLI layers its global flags on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use rwtool_core::{ConsoleConfig, NoticeTimings, Role, Session};

const KEYRING_SERVICE: &str = "rwtool";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "RWTOOL_CONFIG";
/// Environment variable carrying a session token.
pub const TOKEN_ENV: &str = "RWTOOL_TOKEN";
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up a profile, or the default one when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name.unwrap_or_else(|| self.active_profile_name());
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named server profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "http://localhost:8080").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Session identity used for subscriber calls and request bodies.
    pub email: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    /// `ADMIN`, `OPS` or `USER`.
    pub role: Option<String>,

    /// How long success/error notices stay up (ms).
    pub notice_ms: Option<u64>,
    /// How long validation notices stay up (ms).
    pub validation_notice_ms: Option<u64>,

    /// Session token (plaintext; prefer the keyring).
    pub token: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout: None,
            email: None,
            name: None,
            department: None,
            role: None,
            notice_ms: None,
            validation_notice_ms: None,
            token: None,
        }
    }
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Parsed role, defaulting to a subscriber.
    pub fn role(&self) -> Result<Role, ConfigError> {
        match self.role.as_deref().map(str::trim) {
            None | Some("") => Ok(Role::default()),
            Some(raw) => raw.parse().map_err(|_| ConfigError::Validation {
                field: "role".into(),
                reason: format!("expected ADMIN, OPS or USER, got '{raw}'"),
            }),
        }
    }

    /// Session identity described by this profile.
    pub fn session(&self) -> Result<Session, ConfigError> {
        let email = self.email.clone().unwrap_or_default();
        let name = self.name.clone().unwrap_or_default();
        let mut session = Session::new(email, name, self.role()?);
        if let Some(dept) = &self.department {
            session = session.with_department(dept.clone());
        }
        Ok(session)
    }

    pub fn notice_timings(&self) -> NoticeTimings {
        let defaults = NoticeTimings::default();
        NoticeTimings {
            default: self.notice_ms.map_or(defaults.default, Duration::from_millis),
            validation: self
                .validation_notice_ms
                .map_or(defaults.validation, Duration::from_millis),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `RWTOOL_CONFIG`, else platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "rwtool", "rwtool").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("rwtool");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file, layered as defaults → file → `RWTOOL_` env.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RWTOOL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Token storage ───────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

/// Resolve the session token: `RWTOOL_TOKEN`, then the keyring, then
/// the plaintext profile field. `None` when no token is stored.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Ok(val) = std::env::var(TOKEN_ENV) {
        if !val.is_empty() {
            return Some(SecretString::from(val));
        }
    }

    if let Ok(secret) = keyring_entry(profile_name).and_then(|e| e.get_password()) {
        return Some(SecretString::from(secret));
    }

    profile.token.clone().map(SecretString::from)
}

/// Where a token ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStore {
    Keyring,
    /// Keyring unavailable; saved in the config file.
    Plaintext,
}

/// Store a token in the keyring, falling back to the profile's plaintext
/// field. The caller saves the config when `Plaintext` is returned.
pub fn store_token(profile: &mut Profile, profile_name: &str, token: &SecretString) -> TokenStore {
    match keyring_entry(profile_name).and_then(|e| e.set_password(token.expose_secret())) {
        Ok(()) => {
            profile.token = None;
            TokenStore::Keyring
        }
        Err(err) => {
            debug!(error = %err, "keyring unavailable, storing token in config");
            profile.token = Some(token.expose_secret().to_owned());
            TokenStore::Plaintext
        }
    }
}

/// Forget a stored token everywhere it may live.
pub fn clear_token(profile: &mut Profile, profile_name: &str) {
    if let Ok(entry) = keyring_entry(profile_name) {
        let _ = entry.delete_credential();
    }
    profile.token = None;
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ConsoleConfig` from a profile, with no flag overrides.
pub fn profile_to_console_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ConsoleConfig, ConfigError> {
    let url: url::Url = profile
        .api_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", profile.api_url),
        })?;

    let mut config = ConsoleConfig::new(url, profile.session()?);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));
    config.token = resolve_token(profile, profile_name);
    config.notices = profile.notice_timings();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Config {
        let mut profile = Profile::new("http://reports.internal:9090");
        profile.email = Some("ann@corp.com".into());
        profile.name = Some("Ann".into());
        profile.department = Some("Finance".into());
        profile.role = Some("ops".into());
        profile.notice_ms = Some(5000);

        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), profile);
        cfg
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        save_config_to(&sample(), &path).expect("save");
        let loaded = load_config_from(&path).expect("load");

        let (name, profile) = loaded.profile(None).expect("default profile");
        assert_eq!(name, "default");
        assert_eq!(profile.api_url, "http://reports.internal:9090");
        assert_eq!(profile.role().expect("role"), Role::Ops);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
        assert!(matches!(
            cfg.profile(Some("prod")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn console_config_from_profile() {
        let cfg = sample();
        let (name, profile) = cfg.profile(None).expect("profile");
        let console = profile_to_console_config(profile, name).expect("console");

        assert_eq!(console.url.as_str(), "http://reports.internal:9090/");
        assert_eq!(console.timeout, Duration::from_secs(30));
        assert_eq!(console.session.email, "ann@corp.com");
        assert_eq!(console.session.department.as_deref(), Some("Finance"));
        assert_eq!(console.notices.default, Duration::from_millis(5000));
        assert_eq!(console.notices.validation, NoticeTimings::VALIDATION);
    }

    #[test]
    fn bad_url_and_role_are_rejected() {
        let mut profile = Profile::new("not a url");
        assert!(matches!(
            profile_to_console_config(&profile, "x"),
            Err(ConfigError::Validation { ref field, .. }) if field == "api_url"
        ));

        profile.api_url = DEFAULT_API_URL.into();
        profile.role = Some("superuser".into());
        assert!(matches!(profile.role(), Err(ConfigError::Validation { .. })));
    }
}
