// ── Report files ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifies one report file by folder and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportRef {
    pub folder: String,
    pub file_name: String,
}

impl ReportRef {
    pub fn new(folder: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            file_name: file_name.into(),
        }
    }

    /// Both parts present and non-blank.
    pub fn is_complete(&self) -> bool {
        !self.folder.trim().is_empty() && !self.file_name.trim().is_empty()
    }
}

/// A report file visible to the current user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFile {
    pub file_name: String,
    /// Empty when the server did not say which folder the file is in.
    pub folder: String,
    pub size: Option<u64>,
    /// Server-formatted modification time, passed through for display.
    pub last_modified: Option<String>,
    /// Any additional keys the server attached.
    pub extra: Map<String, Value>,
}

impl ReportFile {
    pub fn reference(&self) -> ReportRef {
        ReportRef::new(self.folder.clone(), self.file_name.clone())
    }
}

/// From the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub reference: ReportRef,
    pub size: u64,
    pub content_type: Option<String>,
    pub exists: bool,
}
