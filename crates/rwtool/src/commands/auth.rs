//! Login, signup and identity handlers.

use std::io::BufRead;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use rwtool_core::auth::{self, SIGNUP_OK};
use rwtool_core::{CoreError, SignupForm};
use rwtool_config::TokenStore;

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::CommandContext;

// ── Password input ──────────────────────────────────────────────────

fn read_password(prompt: &str, from_stdin: bool) -> Result<SecretString, CliError> {
    let raw = if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_owned()
    } else {
        rpassword::prompt_password(prompt)?
    };
    Ok(SecretString::from(raw))
}

fn prompt_email() -> Result<String, CliError> {
    dialoguer::Input::new()
        .with_prompt("Email")
        .interact_text()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

// ── Error mapping ───────────────────────────────────────────────────

fn login_error(err: CoreError, profile: &str) -> CliError {
    match err {
        CoreError::Network { .. } | CoreError::Validation { .. } => err.into(),
        other => CliError::AuthFailed {
            message: auth::login_failure_message(&other),
            profile: profile.into(),
        },
    }
}

fn signup_error(err: CoreError) -> CliError {
    match err {
        CoreError::Network { .. } | CoreError::Validation { .. } => err.into(),
        other => CliError::Validation {
            message: auth::signup_failure_message(&other).into(),
        },
    }
}

// ── Whoami ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Identity<'a> {
    profile: &'a str,
    server: String,
    email: &'a str,
    name: &'a str,
    department: Option<&'a str>,
    role: String,
    landing: String,
}

fn identity_detail(i: &Identity<'_>) -> String {
    output::detail_lines(&[
        ("Profile", i.profile.to_owned()),
        ("Server", i.server.clone()),
        ("Email", output::or_dash(Some(i.email))),
        ("Name", output::or_dash(Some(i.name))),
        ("Department", output::or_dash(i.department)),
        ("Role", i.role.clone()),
        ("Landing", i.landing.clone()),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: AuthArgs,
    ctx: &CommandContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Login {
            email,
            password_stdin,
        } => {
            let email = match email {
                Some(email) => email,
                None => prompt_email()?,
            };
            let password = read_password("Password: ", password_stdin)?;
            let outcome = auth::login(&*ctx.gateways.auth, &email, &password)
                .await
                .map_err(|e| login_error(e, &ctx.profile))?;

            let mut cfg = config::load_config_or_default();
            let profile = cfg.profiles.entry(ctx.profile.clone()).or_default();
            if let Some(url) = &global.api_url {
                url.clone_into(&mut profile.api_url);
            }
            let session = &outcome.session;
            profile.email = Some(session.email.clone());
            if !session.name.is_empty() {
                profile.name = Some(session.name.clone());
            }
            if let Some(dept) = &session.department {
                profile.department = Some(dept.clone());
            }
            profile.role = Some(session.role.to_string());
            let store = rwtool_config::store_token(profile, &ctx.profile, &outcome.token);
            config::save_config(&cfg)?;

            ctx.notice(
                global,
                &format!(
                    "Logged in as {} ({}). Start with: {}",
                    session.email, session.role, outcome.landing
                ),
            );
            if store == TokenStore::Plaintext {
                ctx.notice(global, "Keyring unavailable; token saved in the config file");
            }
            Ok(())
        }

        AuthCommand::Signup {
            name,
            email,
            phone,
            domain,
            role,
            password_stdin,
        } => {
            let role = config::parse_role(&role)?;
            let password = read_password("Password: ", password_stdin)?;
            let confirm = if password_stdin {
                password.clone()
            } else {
                read_password("Confirm password: ", false)?
            };
            let form = SignupForm {
                name,
                email,
                phone,
                domain,
                password: password.expose_secret().to_owned(),
                confirm_password: confirm.expose_secret().to_owned(),
                role,
            };
            auth::signup(&*ctx.gateways.auth, &form)
                .await
                .map_err(signup_error)?;
            ctx.notice(global, SIGNUP_OK);
            Ok(())
        }

        AuthCommand::Logout => {
            let mut cfg = config::load_config_or_default();
            if let Some(profile) = cfg.profiles.get_mut(&ctx.profile) {
                rwtool_config::clear_token(profile, &ctx.profile);
                config::save_config(&cfg)?;
            }
            ctx.notice(global, "Logged out");
            Ok(())
        }

        AuthCommand::Whoami => {
            let session = &ctx.session;
            let identity = Identity {
                profile: &ctx.profile,
                server: ctx.server.clone(),
                email: &session.email,
                name: &session.name,
                department: session.department.as_deref(),
                role: session.role.to_string(),
                landing: session.role.landing_screen().to_string(),
            };
            let out = output::render_single(&global.output, &identity, identity_detail, |i| {
                i.email.to_owned()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
