//! Request and response types for the report platform REST API.
//!
//! Field names match the server's JSON (camelCase). Timestamps are kept as
//! the server's `LocalDateTime` strings; `rwtool-core` parses them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Domains ──────────────────────────────────────────────────────────

/// Report category, from `GET /api/domains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
}

/// Body for `POST /api/domains` and `PUT /api/domains/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainBody {
    pub name: String,
    pub description: String,
}

// ── Subscriptions ────────────────────────────────────────────────────

/// Subscription request, from `GET /api/subscriptions`.
///
/// `status` is one of `PENDING`, `APPROVED`, `REJECTED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default)]
    pub request_reason: Option<String>,
    pub status: String,
    #[serde(default)]
    pub requested_date: Option<String>,
    #[serde(default)]
    pub reviewed_date: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub user_department: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
}

/// Body for `POST /api/subscriptions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreateBody {
    pub domain_id: String,
    pub domain_name: String,
    pub request_reason: String,
    pub user_name: String,
    pub user_email: String,
    pub user_department: Option<String>,
    pub user_role: Option<String>,
}

/// Body for `PUT /api/subscriptions/{id}/reject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectBody {
    pub rejection_reason: String,
}

/// Body for `PUT /api/subscriptions/{id}/review`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    /// `APPROVE` or `REJECT`.
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Aggregate counts, from `GET /api/subscriptions/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatsResponse {
    pub total_requests: u64,
    pub pending_requests: u64,
    pub approved_requests: u64,
    pub rejected_requests: u64,
    pub approval_rate: f64,
}

// ── User groups ──────────────────────────────────────────────────────

/// Active Directory group with folder access, from `GET /api/user-groups`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupResponse {
    pub id: i64,
    pub ad_group_name: String,
    #[serde(default)]
    pub associated_domain: Option<String>,
    #[serde(default)]
    pub folder_access: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub updated_date: Option<String>,
}

/// Body for `POST /api/user-groups` and `PUT /api/user-groups/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupBody {
    pub ad_group_name: String,
    pub folder_access: Vec<String>,
    pub associated_domain: String,
    pub members: Vec<String>,
}

// ── Folders & reports ────────────────────────────────────────────────

/// A report file inside a folder, from `GET /api/folders/{name}/files`.
///
/// The server returns loosely-typed maps; known keys are lifted out and
/// everything else is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFileResponse {
    #[serde(alias = "name")]
    pub file_name: String,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub last_modified: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// From `GET /api/reports/metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadataResponse {
    pub file_name: String,
    pub folder: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub exists: bool,
}

/// One `{folder, fileName}` pair, used by batch download and favorites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub folder: String,
    pub file_name: String,
}

/// Body for `POST /api/files/download/batch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDownloadBody {
    pub files: Vec<FileRef>,
    pub zip_name: String,
}

/// Body for `POST /reports/{id}/presign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignBody {
    pub user_id: String,
    pub folder: String,
    pub file_name: String,
}

/// From `POST /reports/{id}/presign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignResponse {
    pub url: String,
}

// ── Favorites ────────────────────────────────────────────────────────

/// Body for `POST` / `DELETE /api/favorites`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteBody {
    pub user_id: String,
    pub folder: String,
    pub file_name: String,
}

/// From `GET /api/favorites?userId=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesResponse {
    #[serde(default)]
    pub favorites: Vec<FileRef>,
}

// ── Auth ─────────────────────────────────────────────────────────────

/// Body for `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// From `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Body for `POST /api/auth/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    /// Only sent for the `USER` role.
    pub domain: Option<String>,
    pub password: String,
    /// `USER`, `ADMIN`, or `OPS`.
    pub role: String,
}
