//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Input, Select};

use rwtool_core::Role;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::{self, CliError};
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with stored tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
    cfg
}

/// TOML-like listing for table output.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(default) = &cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.iter().collect();
    names.sort_by_key(|(name, _)| name.as_str());
    for (name, p) in names {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        let strings = [
            ("email", &p.email),
            ("name", &p.name),
            ("department", &p.department),
            ("role", &p.role),
            ("token", &p.token),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                let _ = writeln!(out, "{key} = \"{value}\"");
            }
        }
        let numbers = [
            ("timeout", p.timeout),
            ("notice_ms", p.notice_ms),
            ("validation_notice_ms", p.validation_notice_ms),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                let _ = writeln!(out, "{key} = {value}");
            }
        }
    }

    out.trim_end().to_owned()
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::InvalidArgument {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn number(key: &str, value: &str) -> Result<u64, CliError> {
    value.trim().parse().map_err(|_| CliError::InvalidArgument {
        field: key.into(),
        reason: "must be a whole number".into(),
    })
}

/// Non-blank value or `None` to clear the field.
fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Apply `config set <key> <value>` to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            url::Url::parse(value.trim()).map_err(|e| CliError::InvalidArgument {
                field: "api_url".into(),
                reason: format!("invalid URL: {e}"),
            })?;
            profile.api_url = value.trim().to_owned();
        }
        "timeout" => profile.timeout = Some(number(key, &value)?),
        "email" => profile.email = optional(value),
        "name" => profile.name = optional(value),
        "department" => profile.department = optional(value),
        "role" => {
            let role = config::parse_role(&value)?;
            profile.role = Some(role.to_string());
        }
        "notice_ms" | "notice-ms" => profile.notice_ms = Some(number(key, &value)?),
        "validation_notice_ms" | "validation-notice-ms" => {
            profile.validation_notice_ms = Some(number(key, &value)?);
        }
        other => {
            return Err(CliError::InvalidArgument {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: api_url, timeout, email, name, \
                     department, role, notice_ms, validation_notice_ms"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;
            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.active_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: rwtool config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if let Err(err) = cfg.profile(Some(&name)) {
                return Err(error::unknown_profile(err, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}

/// Interactive wizard writing one profile and making it the default.
fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("rwtool configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("Server URL")
        .default(rwtool_config::DEFAULT_API_URL.into())
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = Profile::default();
    set_key(&mut profile, "api_url", api_url)?;

    let email: String = Input::new()
        .with_prompt("Your email (blank to skip)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    profile.email = optional(email);

    let name: String = Input::new()
        .with_prompt("Display name (blank to skip)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    profile.name = optional(name);

    let department: String = Input::new()
        .with_prompt("Department (blank to skip)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    profile.department = optional(department);

    let roles = [Role::User, Role::Admin, Role::Ops];
    let labels: Vec<String> = roles.iter().map(ToString::to_string).collect();
    let choice = Select::new()
        .with_prompt("Role")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    profile.role = roles.get(choice).map(ToString::to_string);

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    let path = config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Next: rwtool auth login");
    Ok(())
}
