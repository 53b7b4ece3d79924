// ── Session identity ──
//
// Who the console is acting as. The identity is passed explicitly into
// every screen; nothing reads it from ambient storage. The role carried
// in a login token is a navigation hint only: the server enforces
// permissions on every call.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::screens::ScreenKind;

/// Account role as the platform spells it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Ops,
    #[default]
    User,
}

impl Role {
    /// Screen to open after login.
    pub fn landing_screen(self) -> ScreenKind {
        match self {
            Self::Admin | Self::Ops => ScreenKind::Dashboard,
            Self::User => ScreenKind::Catalog,
        }
    }

    pub fn is_administrative(self) -> bool {
        matches!(self, Self::Admin | Self::Ops)
    }
}

/// The identity used for subscriber-side calls and request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub name: String,
    pub department: Option<String>,
    pub role: Role,
}

impl Session {
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            department: None,
            role,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        let department = department.into();
        self.department = (!department.trim().is_empty()).then_some(department);
        self
    }

    /// Display name, falling back to the email when no name is known.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

// ── Token claims ─────────────────────────────────────────────────────

/// The subset of login-token claims the console cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "department")]
    pub domain: Option<String>,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT without verifying it.
    ///
    /// Returns `None` for anything that is not a three-part token with a
    /// JSON payload.
    pub fn decode(token: &str) -> Option<Self> {
        let mut parts = token.split('.');
        let (_, payload, _) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Role hint, if the token carried a recognizable one.
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    /// Build a session, preferring token claims over the login form's email.
    pub fn into_session(self, login_email: &str) -> Session {
        let role = self.role().unwrap_or_default();
        let email = self
            .email
            .or(self.sub)
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| login_email.to_owned());
        let name = self.name.unwrap_or_default();
        let session = Session::new(email, name, role);
        match self.domain {
            Some(domain) => session.with_department(domain),
            None => session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(payload: &str) -> String {
        format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn decodes_role_and_subject() {
        let claims = TokenClaims::decode(&token(r#"{"sub":"ops@corp.com","role":"OPS"}"#))
            .expect("claims");
        assert_eq!(claims.role(), Some(Role::Ops));
        let session = claims.into_session("typed@corp.com");
        assert_eq!(session.email, "ops@corp.com");
        assert_eq!(session.role.landing_screen(), ScreenKind::Dashboard);
    }

    #[test]
    fn user_lands_on_catalog() {
        let claims = TokenClaims::decode(&token(r#"{"role":"user","domain":"Finance"}"#))
            .expect("claims");
        let session = claims.into_session("ann@corp.com");
        assert_eq!(session.email, "ann@corp.com");
        assert_eq!(session.department.as_deref(), Some("Finance"));
        assert_eq!(session.role.landing_screen(), ScreenKind::Catalog);
    }

    #[test]
    fn garbage_tokens_decode_to_none() {
        assert_eq!(TokenClaims::decode("not-a-token"), None);
        assert_eq!(TokenClaims::decode("a.!!!.c"), None);
        assert_eq!(TokenClaims::decode(&token("not json")), None);
        assert_eq!(TokenClaims::decode("a.b.c.d"), None);
    }

    #[test]
    fn blank_department_is_dropped() {
        let s = Session::new("a@b.co", "", Role::User).with_department("  ");
        assert_eq!(s.department, None);
        assert_eq!(s.display_name(), "a@b.co");
    }
}
