// ── Domain catalog (subscriber) ──
//
// Every domain joined with the session user's own request for it, so a
// subscriber sees at a glance what they can request, what is pending,
// and what was granted or refused.

use std::collections::HashMap;
use std::sync::Arc;

use super::{FilterState, Slot};
use crate::error::CoreError;
use crate::gateway::{Gateways, SubscriptionGateway};
use crate::model::{Domain, DomainId, NewRequest, SubscriptionRequest, SubscriptionStatus};
use crate::notify::Notifier;
use crate::projection::{Searchable, project};
use crate::session::Session;
use crate::sync::SyncController;
use crate::validation;

const LOAD_FAILED: &str = "Error loading domains. Please try again.";
const SUBMITTED: &str = "Subscription request submitted successfully!";
const SUBMIT_FAILED: &str = "Failed to submit request";
const CANCELLED: &str = "Request cancelled successfully";
const CANCEL_FAILED: &str = "Error cancelling request";

/// Status filter choices, lower-case as shown on the catalog.
pub const STATUS_CHOICES: [&str; 3] = ["pending", "approved", "rejected"];

/// One domain and the session user's request for it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub domain: Domain,
    pub request: Option<SubscriptionRequest>,
    /// Lower-case request status, `None` when never requested.
    pub status: Option<String>,
}

impl CatalogEntry {
    fn new(domain: Domain, request: Option<SubscriptionRequest>) -> Self {
        let status = request.as_ref().map(|r| r.status.lower());
        Self {
            domain,
            request,
            status,
        }
    }

    /// No request yet, so access can be asked for.
    pub fn can_request(&self) -> bool {
        self.request.is_none()
    }

    /// Only a pending request can be withdrawn.
    pub fn can_cancel(&self) -> bool {
        self.request.as_ref().is_some_and(SubscriptionRequest::is_pending)
    }
}

impl Searchable for CatalogEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.domain.name.as_str(), self.domain.description.as_str()]
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

/// Join domains with the user's requests on domain id.
fn join(domains: Vec<Domain>, requests: Vec<SubscriptionRequest>) -> Vec<CatalogEntry> {
    let mut by_domain: HashMap<DomainId, SubscriptionRequest> = HashMap::new();
    for r in requests {
        if let Some(id) = r.domain_id.clone() {
            by_domain.entry(id).or_insert(r);
        }
    }
    domains
        .into_iter()
        .map(|d| {
            let request = by_domain.remove(&d.id);
            CatalogEntry::new(d, request)
        })
        .collect()
}

/// Per-status counts over the whole catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// The "request access" dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDialog {
    pub domain: Domain,
    pub reason: String,
    /// Shown inside the dialog: validation text or the server's message.
    pub error: Option<String>,
}

pub struct Catalog {
    notifier: Notifier,
    session: Session,
    entries: SyncController<CatalogEntry>,
    gateway: Arc<dyn SubscriptionGateway>,
    filter: FilterState,
    dialog: Slot<RequestDialog>,
}

impl Catalog {
    pub fn new(gateways: &Gateways, notifier: Notifier, session: Session) -> Self {
        let gateway = Arc::clone(&gateways.subscriptions);
        let domains = Arc::clone(&gateways.domains);
        let requests = Arc::clone(&gateway);
        let email = session.email.clone();
        let entries = SyncController::new("catalog", LOAD_FAILED, notifier.clone(), move || {
            let domains = Arc::clone(&domains);
            let requests = Arc::clone(&requests);
            let email = email.clone();
            async move {
                let (d, r) = tokio::try_join!(domains.list_domains(), requests.list_for_user(email))?;
                Ok(join(d, r))
            }
        });
        Self {
            notifier,
            session,
            entries,
            gateway,
            filter: FilterState::default(),
            dialog: Slot::default(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn entries(&self) -> &SyncController<CatalogEntry> {
        &self.entries
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn dialog(&self) -> &Slot<RequestDialog> {
        &self.dialog
    }

    pub async fn load(&self) -> Result<(), CoreError> {
        self.entries.refresh().await
    }

    pub fn visible(&self) -> Vec<Arc<CatalogEntry>> {
        let filter = self.filter.get();
        project(&self.entries.items(), &filter.search, &filter.status)
    }

    pub fn counts(&self) -> CatalogCounts {
        let items = self.entries.items();
        let count = |s: &str| items.iter().filter(|e| e.status.as_deref() == Some(s)).count();
        CatalogCounts {
            total: items.len(),
            pending: count("pending"),
            approved: count("approved"),
            rejected: count("rejected"),
        }
    }

    fn entry(&self, id: &DomainId) -> Result<Arc<CatalogEntry>, CoreError> {
        self.entries
            .items()
            .iter()
            .find(|e| &e.domain.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                message: Some(format!("Domain {id} not found")),
            })
    }

    // ── Request access ───────────────────────────────────────────────

    pub fn open_request(&self, id: &DomainId) -> Result<(), CoreError> {
        let entry = self.entry(id)?;
        if !entry.can_request() {
            return Err(CoreError::validation("Access to this domain was already requested"));
        }
        self.dialog.open(RequestDialog {
            domain: entry.domain.clone(),
            reason: String::new(),
            error: None,
        });
        Ok(())
    }

    pub fn set_reason(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.dialog.update(|d| d.reason = reason);
    }

    pub fn close_request(&self) {
        self.dialog.close();
    }

    /// Submit the open request. Errors stay visible inside the dialog.
    pub async fn submit_request(&self) -> Result<SubscriptionRequest, CoreError> {
        let Some(dialog) = self.dialog.get() else {
            return Err(CoreError::validation("No domain selected"));
        };
        if let Err(err) = validation::request_reason(&dialog.reason) {
            let message = err.user_message("");
            self.dialog.update(|d| d.error = Some(message.clone()));
            self.notifier.validation(message);
            return Err(err);
        }

        let request = NewRequest {
            domain_id: dialog.domain.id.clone(),
            domain_name: dialog.domain.name.clone(),
            reason: dialog.reason.clone(),
            user_name: self.session.name.clone(),
            user_email: self.session.email.clone(),
            user_department: self.session.department.clone(),
            user_role: Some(self.session.role.to_string()),
        };
        match self
            .entries
            .mutate(self.gateway.create_request(request), SUBMITTED, SUBMIT_FAILED)
            .await
        {
            Ok(created) => {
                self.dialog.close();
                Ok(created)
            }
            Err(err) => {
                let message = err.user_message(SUBMIT_FAILED);
                self.dialog.update(|d| d.error = Some(message));
                Err(err)
            }
        }
    }

    // ── Cancel ───────────────────────────────────────────────────────

    /// Withdraw the user's pending request for a domain.
    pub async fn cancel_request(&self, id: &DomainId) -> Result<(), CoreError> {
        let entry = self.entry(id)?;
        let Some(request) = entry.request.as_ref().filter(|r| r.status == SubscriptionStatus::Pending)
        else {
            let err = CoreError::validation("Only pending requests can be cancelled");
            self.notifier.validation(err.user_message(""));
            return Err(err);
        };
        self.entries
            .mutate(
                self.gateway.cancel(request.id.clone(), self.session.email.clone()),
                CANCELLED,
                CANCEL_FAILED,
            )
            .await
    }

    pub fn discard(&self) {
        self.entries.discard();
        self.notifier.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gateway::{
        MockAuthGateway, MockDomainGateway, MockFolderGateway, MockReportGateway,
        MockSubscriptionGateway, MockUserGroupGateway,
    };
    use crate::projection::StatusFilter;
    use crate::screens::fixtures::{domain, request, subscriber};

    fn gateways(subs: MockSubscriptionGateway) -> Gateways {
        let mut domains = MockDomainGateway::new();
        domains.expect_list_domains().returning(|| {
            Ok(vec![
                domain("d-finance", "Finance"),
                domain("d-credit", "Credit"),
                domain("d-risk", "Risk"),
            ])
        });
        Gateways {
            domains: Arc::new(domains),
            subscriptions: Arc::new(subs),
            groups: Arc::new(MockUserGroupGateway::new()),
            folders: Arc::new(MockFolderGateway::new()),
            reports: Arc::new(MockReportGateway::new()),
            auth: Arc::new(MockAuthGateway::new()),
        }
    }

    fn status_of(catalog: &Catalog, id: &str) -> Option<String> {
        catalog
            .entries()
            .items()
            .iter()
            .find(|e| e.domain.id.as_str() == id)
            .and_then(|e| e.status.clone())
    }

    #[tokio::test]
    async fn joins_domains_with_own_requests() {
        let mut subs = MockSubscriptionGateway::new();
        subs.expect_list_for_user()
            .withf(|email| email == "ann@corp.com")
            .returning(|_| {
                Ok(vec![
                    request("1", "Finance", SubscriptionStatus::Pending),
                    request("2", "Credit", SubscriptionStatus::Approved),
                ])
            });

        let catalog = Catalog::new(&gateways(subs), Notifier::default(), subscriber());
        catalog.load().await.expect("load");

        assert_eq!(status_of(&catalog, "d-finance").as_deref(), Some("pending"));
        assert_eq!(status_of(&catalog, "d-credit").as_deref(), Some("approved"));
        assert_eq!(status_of(&catalog, "d-risk"), None);
        assert_eq!(
            catalog.counts(),
            CatalogCounts {
                total: 3,
                pending: 1,
                approved: 1,
                rejected: 0
            }
        );

        catalog.filter().set_status(StatusFilter::from("approved"));
        let names: Vec<_> = catalog.visible().iter().map(|e| e.domain.name.clone()).collect();
        assert_eq!(names, vec!["Credit"]);
    }

    #[tokio::test]
    async fn blank_reason_stays_in_dialog() {
        let mut subs = MockSubscriptionGateway::new();
        subs.expect_list_for_user().returning(|_| Ok(vec![]));
        subs.expect_create_request().never();

        let catalog = Catalog::new(&gateways(subs), Notifier::default(), subscriber());
        catalog.load().await.expect("load");
        catalog.open_request(&"d-risk".into()).expect("open");
        catalog.set_reason("   ");
        assert!(catalog.submit_request().await.is_err());

        let dialog = catalog.dialog().get().expect("still open");
        assert_eq!(dialog.error.as_deref(), Some("Please type a reason for your request"));
    }

    #[tokio::test]
    async fn submit_carries_session_identity() {
        let filed = Arc::new(Mutex::new(false));
        let mut subs = MockSubscriptionGateway::new();
        {
            let filed = filed.clone();
            subs.expect_list_for_user().returning(move |_| {
                Ok(if *filed.lock().expect("lock") {
                    vec![request("9", "Risk", SubscriptionStatus::Pending)]
                } else {
                    vec![]
                })
            });
        }
        {
            let filed = filed.clone();
            subs.expect_create_request()
                .withf(|r| {
                    r.domain_id.as_str() == "d-risk"
                        && r.user_email == "ann@corp.com"
                        && r.user_department.as_deref() == Some("Finance")
                        && r.user_role.as_deref() == Some("USER")
                        && r.reason == "month-end"
                })
                .times(1)
                .returning(move |_| {
                    *filed.lock().expect("lock") = true;
                    Ok(request("9", "Risk", SubscriptionStatus::Pending))
                });
        }

        let catalog = Catalog::new(&gateways(subs), Notifier::default(), subscriber());
        catalog.load().await.expect("load");
        catalog.open_request(&"d-risk".into()).expect("open");
        catalog.set_reason("month-end");
        catalog.submit_request().await.expect("submit");

        assert!(!catalog.dialog().is_open());
        assert_eq!(status_of(&catalog, "d-risk").as_deref(), Some("pending"));
        assert_eq!(
            catalog.notifier().current().map(|n| n.message).as_deref(),
            Some("Subscription request submitted successfully!")
        );
    }

    #[tokio::test]
    async fn server_error_kept_in_dialog() {
        let mut subs = MockSubscriptionGateway::new();
        subs.expect_list_for_user().returning(|_| Ok(vec![]));
        subs.expect_create_request().returning(|_| {
            Err(CoreError::Server {
                status: Some(409),
                message: Some("You already have a pending request for this domain".into()),
                code: None,
            })
        });

        let catalog = Catalog::new(&gateways(subs), Notifier::default(), subscriber());
        catalog.load().await.expect("load");
        catalog.open_request(&"d-credit".into()).expect("open");
        catalog.set_reason("audit");
        assert!(catalog.submit_request().await.is_err());
        assert_eq!(
            catalog.dialog().get().and_then(|d| d.error).as_deref(),
            Some("You already have a pending request for this domain")
        );
    }

    #[tokio::test]
    async fn cancel_only_pending() {
        let mut subs = MockSubscriptionGateway::new();
        subs.expect_list_for_user().returning(|_| {
            Ok(vec![
                request("1", "Finance", SubscriptionStatus::Pending),
                request("2", "Credit", SubscriptionStatus::Approved),
            ])
        });
        subs.expect_cancel()
            .withf(|id, email| id.as_str() == "1" && email == "ann@corp.com")
            .times(1)
            .returning(|_, _| Err(CoreError::Network { reason: "refused".into() }));

        let catalog = Catalog::new(&gateways(subs), Notifier::default(), subscriber());
        catalog.load().await.expect("load");

        assert!(catalog.cancel_request(&"d-credit".into()).await.is_err());
        assert!(catalog.cancel_request(&"d-finance".into()).await.is_err());
        assert_eq!(
            catalog.notifier().current().map(|n| n.message).as_deref(),
            Some("Error cancelling request")
        );
    }

    #[tokio::test]
    async fn load_failure_message() {
        let mut subs = MockSubscriptionGateway::new();
        subs.expect_list_for_user()
            .returning(|_| Err(CoreError::Network { reason: "refused".into() }));

        let catalog = Catalog::new(&gateways(subs), Notifier::default(), subscriber());
        assert!(catalog.load().await.is_err());
        assert_eq!(
            catalog.entries().last_error().as_deref(),
            Some("Error loading domains. Please try again.")
        );
    }
}
