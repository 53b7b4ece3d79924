// ── Screen view-models ──
//
// One struct per console screen. Each owns its notifier and sync
// controllers, keeps dialog and filter state in `watch` channels, and
// exposes the operations its screen offers. Renderers (TUI, tests) only
// read state and call these operations; none of them talk to a gateway.

pub mod approvals;
pub mod catalog;
pub mod dashboard;
pub mod domains;
pub mod my_subscriptions;
pub mod report_viewer;
pub mod user_groups;

use serde::Serialize;
use strum::{Display, EnumIter};
use tokio::sync::watch;

pub use approvals::{ApprovalQueue, ApprovalRow, RejectDialog, RejectionChoice};
pub use catalog::{Catalog, CatalogCounts, CatalogEntry, RequestDialog};
pub use dashboard::{Dashboard, RECENT_LIMIT};
pub use domains::{DomainEditor, DomainManagement};
pub use my_subscriptions::MySubscriptions;
pub use report_viewer::{OpenReport, ReportViewer};
pub use user_groups::{GroupEditor, UserGroupAccess};

use crate::projection::{StatusFilter, ViewFilter};

/// The seven console screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
pub enum ScreenKind {
    #[strum(to_string = "Dashboard")]
    Dashboard,
    #[strum(to_string = "Domains")]
    Domains,
    #[strum(to_string = "Approvals")]
    Approvals,
    #[strum(to_string = "Groups")]
    UserGroups,
    #[strum(to_string = "Catalog")]
    Catalog,
    #[strum(to_string = "My Subscriptions")]
    MySubscriptions,
    #[strum(to_string = "Reports")]
    Reports,
}

impl ScreenKind {
    /// Screens meant for administrators and operators.
    pub fn is_administrative(self) -> bool {
        matches!(
            self,
            Self::Dashboard | Self::Domains | Self::Approvals | Self::UserGroups
        )
    }
}

// ── Shared dialog state ──────────────────────────────────────────────

/// A create/edit dialog. `editing` is `None` when creating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor<I, D> {
    pub editing: Option<I>,
    pub draft: D,
}

impl<I, D: Default> Editor<I, D> {
    pub fn create() -> Self {
        Self {
            editing: None,
            draft: D::default(),
        }
    }
}

impl<I, D> Editor<I, D> {
    pub fn edit(id: I, draft: D) -> Self {
        Self {
            editing: Some(id),
            draft,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }
}

/// Search and status filter state shared by every list screen.
#[derive(Debug)]
pub struct FilterState {
    tx: watch::Sender<ViewFilter>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            tx: watch::channel(ViewFilter::default()).0,
        }
    }
}

impl FilterState {
    pub fn get(&self) -> ViewFilter {
        self.tx.borrow().clone()
    }

    pub fn set_search(&self, search: impl Into<String>) {
        let search = search.into();
        self.tx.send_modify(|f| f.search = search);
    }

    pub fn set_status(&self, status: StatusFilter) {
        self.tx.send_modify(|f| f.status = status);
    }

    /// Advance the status filter through `choices`.
    pub fn cycle_status(&self, choices: &[&str]) {
        self.tx.send_modify(|f| f.status = f.status.cycle(choices));
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewFilter> {
        self.tx.subscribe()
    }
}

/// Optional dialog slot observed through a `watch` channel.
#[derive(Debug)]
pub struct Slot<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            tx: watch::channel(None).0,
        }
    }
}

impl<T: Clone> Slot<T> {
    pub fn get(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn open(&self, value: T) {
        self.tx.send_replace(Some(value));
    }

    pub fn close(&self) {
        self.tx.send_replace(None);
    }

    /// Edit the open value in place. No-op when closed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_if_modified(|slot| match slot {
            Some(value) => {
                f(value);
                true
            }
            None => false,
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::{Domain, SubscriptionRequest, SubscriptionStatus, UserGroup};
    use crate::session::{Role, Session};

    pub fn admin() -> Session {
        Session::new("admin@corp.com", "Admin", Role::Admin)
    }

    pub fn subscriber() -> Session {
        Session::new("ann@corp.com", "Ann", Role::User).with_department("Finance")
    }

    pub fn domain(id: &str, name: &str) -> Domain {
        Domain {
            id: id.into(),
            name: name.into(),
            description: format!("{name} reports"),
            created: None,
        }
    }

    pub fn request(id: &str, domain: &str, status: SubscriptionStatus) -> SubscriptionRequest {
        SubscriptionRequest {
            id: id.into(),
            user_name: "Ann".into(),
            user_email: "ann@corp.com".into(),
            domain_id: Some(format!("d-{}", domain.to_lowercase()).into()),
            domain_name: domain.into(),
            request_reason: "quarterly close".into(),
            status,
            requested: None,
            reviewed: None,
            rejection_reason: None,
            user_department: Some("Finance".into()),
            user_role: Some("USER".into()),
        }
    }

    pub fn group(id: i64, name: &str, folders: &[&str]) -> UserGroup {
        UserGroup {
            id: id.into(),
            ad_group_name: name.into(),
            associated_domain: Some("Finance".into()),
            folder_access: folders.iter().map(|f| (*f).to_owned()).collect(),
            members: vec![],
            created: None,
            updated: None,
        }
    }
}
