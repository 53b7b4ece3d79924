// ── Domain (report category) ──

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ids::DomainId;

/// A named report category that users subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub name: String,
    pub description: String,
    pub created: Option<NaiveDateTime>,
}

/// Editable fields of a domain, used for both create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainDraft {
    pub name: String,
    pub description: String,
}

impl DomainDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl From<&Domain> for DomainDraft {
    fn from(d: &Domain) -> Self {
        Self {
            name: d.name.clone(),
            description: d.description.clone(),
        }
    }
}
