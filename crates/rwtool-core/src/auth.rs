// ── Login and signup flows ──
//
// Validate locally, call the auth gateway, and map failures to the
// fixed messages the console shows.

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use rwtool_api::auth::{EMAIL_EXISTS, INVALID_CREDENTIALS};

use crate::error::CoreError;
use crate::gateway::{AuthGateway, NewAccount};
use crate::screens::ScreenKind;
use crate::session::{Role, Session, TokenClaims};
use crate::validation::{self, SignupInput};

pub const INVALID_LOGIN: &str = "Invalid email or password.";
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const SIGNUP_OK: &str = "Account created successfully! Please login.";
pub const EMAIL_TAKEN: &str = "Email already registered. Try logging in.";
pub const SIGNUP_FAILED: &str = "Signup failed. Please try again.";

/// A successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub token: SecretString,
    pub session: Session,
    /// Where to navigate first. A hint only; the server enforces access.
    pub landing: ScreenKind,
}

/// User-facing text for a failed login.
pub fn login_failure_message(err: &CoreError) -> String {
    match err {
        CoreError::Authentication { .. } => INVALID_LOGIN.to_owned(),
        CoreError::Server { code: Some(code), .. } if code == INVALID_CREDENTIALS => {
            INVALID_LOGIN.to_owned()
        }
        CoreError::Validation { message } => message.clone(),
        _ => LOGIN_FAILED.to_owned(),
    }
}

/// User-facing text for a failed signup.
pub fn signup_failure_message(err: &CoreError) -> &'static str {
    match err.code() {
        Some(EMAIL_EXISTS) => EMAIL_TAKEN,
        _ => SIGNUP_FAILED,
    }
}

/// Validate, log in, and derive the session from the token.
///
/// Validation failures come back as `CoreError::Validation` without any
/// request being made.
pub async fn login(
    gateway: &dyn AuthGateway,
    email: &str,
    password: &SecretString,
) -> Result<LoginOutcome, CoreError> {
    let email = email.trim();
    validation::into_result(&validation::login_errors(email, password.expose_secret()))?;

    let token = gateway
        .login(email.to_owned(), password.clone())
        .await
        .inspect_err(|e| warn!(error = %e, "login failed"))?;

    let session = TokenClaims::decode(token.expose_secret())
        .unwrap_or_default()
        .into_session(email);
    let landing = session.role.landing_screen();
    info!(email = %session.email, role = %session.role, "logged in");

    Ok(LoginOutcome {
        token,
        session,
        landing,
    })
}

/// Owned signup form.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub domain: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl SignupForm {
    fn input(&self) -> SignupInput<'_> {
        SignupInput {
            name: &self.name,
            email: &self.email,
            phone: &self.phone,
            domain: &self.domain,
            password: &self.password,
            confirm_password: &self.confirm_password,
            role: self.role,
        }
    }
}

/// Validate and create an account.
pub async fn signup(gateway: &dyn AuthGateway, form: &SignupForm) -> Result<(), CoreError> {
    validation::into_result(&validation::signup_errors(&form.input()))?;

    let domain = (form.role == Role::User).then(|| form.domain.trim().to_owned());
    let account = NewAccount {
        full_name: form.name.trim().to_owned(),
        email: form.email.trim().to_owned(),
        phone_number: validation::normalize_phone(form.phone.trim()),
        domain,
        password: form.password.clone(),
        role: form.role,
    };

    gateway
        .signup(account)
        .await
        .inspect_err(|e| warn!(error = %e, "signup failed"))?;
    info!(email = %form.email.trim(), role = %form.role, "account created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;
    use crate::gateway::MockAuthGateway;

    fn jwt(payload: &str) -> SecretString {
        SecretString::from(format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload)))
    }

    #[tokio::test]
    async fn admin_lands_on_dashboard() {
        let mut gw = MockAuthGateway::new();
        gw.expect_login()
            .withf(|email, _| email == "admin@corp.com")
            .times(1)
            .returning(|_, _| Ok(jwt(r#"{"sub":"admin@corp.com","role":"ADMIN"}"#)));

        let out = login(&gw, " admin@corp.com ", &SecretString::from("secret1"))
            .await
            .expect("login");
        assert_eq!(out.landing, ScreenKind::Dashboard);
        assert_eq!(out.session.role, Role::Admin);
    }

    #[tokio::test]
    async fn invalid_form_never_calls_gateway() {
        let mut gw = MockAuthGateway::new();
        gw.expect_login().never();

        let err = login(&gw, "nope", &SecretString::from("123"))
            .await
            .expect_err("invalid");
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[tokio::test]
    async fn rejected_credentials_message() {
        let mut gw = MockAuthGateway::new();
        gw.expect_login().returning(|_, _| {
            Err(CoreError::Authentication {
                message: "invalid email or password".into(),
            })
        });

        let err = login(&gw, "ann@corp.com", &SecretString::from("secret1"))
            .await
            .expect_err("rejected");
        assert_eq!(login_failure_message(&err), INVALID_LOGIN);

        let other = CoreError::Network {
            reason: "refused".into(),
        };
        assert_eq!(login_failure_message(&other), LOGIN_FAILED);
    }

    #[tokio::test]
    async fn signup_sends_normalized_account() {
        let mut gw = MockAuthGateway::new();
        gw.expect_signup()
            .withf(|a| {
                a.phone_number == "5551234567"
                    && a.domain.as_deref() == Some("Finance")
                    && a.role == Role::User
            })
            .times(1)
            .returning(|_| Ok(()));

        let form = SignupForm {
            name: "Ann".into(),
            email: "ann@corp.com".into(),
            phone: "555-123 4567".into(),
            domain: "Finance".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            role: Role::User,
        };
        signup(&gw, &form).await.expect("signup");
    }

    #[tokio::test]
    async fn ops_signup_omits_domain() {
        let mut gw = MockAuthGateway::new();
        gw.expect_signup()
            .withf(|a| a.domain.is_none() && a.role == Role::Ops)
            .returning(|_| Ok(()));

        let form = SignupForm {
            name: "Olu".into(),
            email: "olu@corp.com".into(),
            phone: "5551234567".into(),
            domain: "ignored".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            role: Role::Ops,
        };
        signup(&gw, &form).await.expect("signup");
    }

    #[test]
    fn email_exists_message() {
        let err = CoreError::Server {
            status: Some(400),
            message: None,
            code: Some(EMAIL_EXISTS.into()),
        };
        assert_eq!(signup_failure_message(&err), EMAIL_TAKEN);
        assert_eq!(
            signup_failure_message(&CoreError::Network { reason: String::new() }),
            SIGNUP_FAILED
        );
    }
}
