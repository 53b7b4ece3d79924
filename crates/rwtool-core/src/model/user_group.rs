// ── User groups ──

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ids::GroupId;

/// An Active Directory group mapped to report folders and a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: GroupId,
    pub ad_group_name: String,
    pub associated_domain: Option<String>,
    pub folder_access: Vec<String>,
    pub members: Vec<String>,
    pub created: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
}

/// Editable fields of a user group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserGroupDraft {
    pub ad_group_name: String,
    pub folder_access: Vec<String>,
    pub associated_domain: String,
    pub members: Vec<String>,
}

impl UserGroupDraft {
    /// Add the folder if absent, remove it if present. Order of first
    /// selection is preserved.
    pub fn toggle_folder(&mut self, folder: &str) {
        if let Some(pos) = self.folder_access.iter().position(|f| f == folder) {
            self.folder_access.remove(pos);
        } else {
            self.folder_access.push(folder.to_owned());
        }
    }
}

impl From<&UserGroup> for UserGroupDraft {
    fn from(g: &UserGroup) -> Self {
        Self {
            ad_group_name: g.ad_group_name.clone(),
            folder_access: g.folder_access.clone(),
            associated_domain: g.associated_domain.clone().unwrap_or_default(),
            members: g.members.clone(),
        }
    }
}

/// A report folder name, as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Folder(pub String);

impl Folder {
    pub fn name(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_folder_adds_then_removes() {
        let mut draft = UserGroupDraft::default();
        draft.toggle_folder("Finance");
        draft.toggle_folder("HR");
        assert_eq!(draft.folder_access, vec!["Finance", "HR"]);
        draft.toggle_folder("Finance");
        assert_eq!(draft.folder_access, vec!["HR"]);
    }
}
