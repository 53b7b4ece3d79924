// Account endpoints
//
// Login returns a signed token whose payload carries the user's role.
// The client never verifies the signature; the token is only forwarded
// as a bearer credential.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{LoginBody, LoginResponse, SignupBody};

/// Error code the server uses for a wrong email/password pair.
pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";

/// Error code the server uses when signing up with a taken email.
pub const EMAIL_EXISTS: &str = "EMAIL_EXISTS";

impl ApiClient {
    /// `POST /api/auth/login` with `{email, password}`.
    ///
    /// HTTP 401 or an `INVALID_CREDENTIALS` code maps to
    /// [`Error::Authentication`]; other failures stay [`Error::Api`].
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, Error> {
        debug!(email, "logging in");
        let body = LoginBody {
            email,
            password: password.expose_secret(),
        };

        match self.post::<LoginResponse, _>(self.api(&["auth", "login"])?, &body).await {
            Ok(resp) => Ok(SecretString::from(resp.token)),
            Err(Error::Api { status, code, .. })
                if status == 401 || code.as_deref() == Some(INVALID_CREDENTIALS) =>
            {
                Err(Error::Authentication {
                    message: "invalid email or password".into(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// `POST /api/auth/signup`. Success is any 2xx (the server answers 201).
    pub async fn signup(&self, body: &SignupBody) -> Result<(), Error> {
        debug!(email = %body.email, role = %body.role, "signing up");
        self.post_no_response(self.api(&["auth", "signup"])?, body)
            .await
    }
}
