//! Actions flowing through the app loop.
//!
//! Key handlers and the data bridge produce actions; `App::process_action`
//! consumes them, handling global ones itself and routing the rest to
//! the active screen.

use std::fmt;

use rwtool_core::{DomainId, Notice};

use crate::screen::ScreenId;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Lifecycle ──
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ──
    SwitchScreen(ScreenId),
    GoBack,

    // ── Data ──
    /// Reload the active screen's collections.
    Refresh,
    /// A collection, filter or dialog behind this screen changed.
    DataChanged(ScreenId),
    /// The screen's notification slot changed.
    NoticeChanged(ScreenId, Option<Notice>),
    DismissNotice,

    // ── Filtering ──
    OpenSearch,
    CloseSearch,
    SearchInput(String),
    SearchSubmit,
    /// Step the status filter to its next value.
    CycleFilter,

    // ── Confirmation ──
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,
    /// Sent to the active screen once the user answered yes.
    Confirmed(ConfirmAction),
    /// Sent to the active screen when the user backed out.
    Declined(ConfirmAction),

    ToggleHelp,
}

/// Operations that need a y/n answer first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteDomain { name: String },
    DeleteGroup { name: String },
    CancelRequest { domain_id: DomainId, domain: String },
}

impl ConfirmAction {
    /// Screen that asked for the confirmation.
    pub fn screen(&self) -> ScreenId {
        match self {
            Self::DeleteDomain { .. } => ScreenId::Domains,
            Self::DeleteGroup { .. } => ScreenId::Groups,
            Self::CancelRequest { .. } => ScreenId::Catalog,
        }
    }
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteDomain { name } => write!(f, "Delete domain {name}?"),
            Self::DeleteGroup { name } => write!(f, "Delete user group {name}?"),
            Self::CancelRequest { domain, .. } => write!(f, "Cancel your request for {domain}?"),
        }
    }
}
