//! Screen logic and resource lifecycle between `rwtool-api` and the
//! console front ends (CLI / TUI).
//!
//! - **[`SyncController<T>`]**: owns one server collection for one screen.
//!   [`refresh()`](SyncController::refresh) replaces the local copy
//!   wholesale and keeps stale data on failure;
//!   [`mutate()`](SyncController::mutate) runs an action, re-fetches, and
//!   only then reports success. State is published through a `watch`
//!   channel and [`SyncStream`].
//!
//! - **[`Notifier`]**: the single transient notice slot with one
//!   cancellable clear timer. A new notice always supersedes the old one.
//!
//! - **Gateways** ([`gateway`]): one `async_trait` per entity family,
//!   implemented over HTTP by [`HttpGateway`]. Screens only see the traits.
//!
//! - **Projection** ([`projection`]): pure search + status filtering.
//!
//! - **Screens** ([`screens`]): one view-model per console screen.
//!
//! - **Domain model** ([`model`]): canonical records converted from the
//!   wire types in [`convert`].

pub mod auth;
pub mod config;
pub mod convert;
pub mod error;
pub mod gateway;
pub mod model;
pub mod notify;
pub mod projection;
pub mod screens;
pub mod session;
pub mod stream;
pub mod sync;
pub mod validation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{LoginOutcome, SignupForm};
pub use config::{ConsoleConfig, NoticeTimings};
pub use error::CoreError;
pub use gateway::{
    AuthGateway, DomainGateway, FolderGateway, Gateways, HttpGateway, NewAccount, ReportGateway,
    SubscriptionGateway, UserGroupGateway,
};
pub use notify::{Notice, NoticeLevel, Notifier};
pub use projection::{Searchable, StatusFilter, ViewFilter};
pub use screens::ScreenKind;
pub use session::{Role, Session, TokenClaims};
pub use stream::SyncStream;
pub use sync::{SyncController, SyncState};

pub use model::{
    Domain, DomainDraft, DomainId, Folder, GroupId, NewRequest, ReportFile, ReportMetadata,
    ReportRef, RequestId, ReviewDecision, SubscriptionRequest, SubscriptionStats,
    SubscriptionStatus, UserGroup, UserGroupDraft,
};
