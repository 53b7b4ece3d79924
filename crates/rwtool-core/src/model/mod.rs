// ── Domain model ──
//
// Canonical representations of the platform's records. Wire types from
// `rwtool_api::types` are converted into these in `crate::convert`;
// screens and the CLI only ever see the types below.

pub mod domain;
pub mod ids;
pub mod report;
pub mod subscription;
pub mod user_group;

// ── Re-exports ──────────────────────────────────────────────────────

pub use domain::{Domain, DomainDraft};
pub use ids::{DomainId, GroupId, RequestId};
pub use report::{ReportFile, ReportMetadata, ReportRef};
pub use subscription::{
    NewRequest, ReviewDecision, SubscriptionRequest, SubscriptionStats, SubscriptionStatus,
    UNKNOWN_DEPARTMENT,
};
pub use user_group::{Folder, UserGroup, UserGroupDraft};
