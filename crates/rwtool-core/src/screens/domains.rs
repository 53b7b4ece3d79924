// ── Domain management ──

use std::sync::Arc;

use super::{Editor, FilterState, Slot};
use crate::error::CoreError;
use crate::gateway::{DomainGateway, Gateways};
use crate::model::{Domain, DomainDraft, DomainId};
use crate::notify::Notifier;
use crate::projection::project;
use crate::sync::SyncController;
use crate::validation;

const LOAD_FAILED: &str = "Error loading domains. Please check if backend is running.";
const CREATED: &str = "Domain created successfully";
const UPDATED: &str = "Domain updated successfully";
const SAVE_FAILED: &str = "Error saving domain";
const DELETED: &str = "Domain deleted successfully";
const DELETE_FAILED: &str = "Error deleting domain";

pub type DomainEditor = Editor<DomainId, DomainDraft>;

pub struct DomainManagement {
    notifier: Notifier,
    domains: SyncController<Domain>,
    gateway: Arc<dyn DomainGateway>,
    filter: FilterState,
    editor: Slot<DomainEditor>,
    pending_delete: Slot<Arc<Domain>>,
}

impl DomainManagement {
    pub fn new(gateways: &Gateways, notifier: Notifier) -> Self {
        let gateway = Arc::clone(&gateways.domains);
        let loader = Arc::clone(&gateway);
        let domains = SyncController::new("domains", LOAD_FAILED, notifier.clone(), move || {
            let gw = Arc::clone(&loader);
            async move { gw.list_domains().await }
        });
        Self {
            notifier,
            domains,
            gateway,
            filter: FilterState::default(),
            editor: Slot::default(),
            pending_delete: Slot::default(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn domains(&self) -> &SyncController<Domain> {
        &self.domains
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn editor(&self) -> &Slot<DomainEditor> {
        &self.editor
    }

    pub fn pending_delete(&self) -> &Slot<Arc<Domain>> {
        &self.pending_delete
    }

    pub async fn load(&self) -> Result<(), CoreError> {
        self.domains.refresh().await
    }

    /// Domains matching the search text (name or description).
    pub fn visible(&self) -> Vec<Arc<Domain>> {
        let filter = self.filter.get();
        project(&self.domains.items(), &filter.search, &filter.status)
    }

    fn find(&self, id: &DomainId) -> Option<Arc<Domain>> {
        self.domains.items().iter().find(|d| &d.id == id).cloned()
    }

    // ── Create / edit ────────────────────────────────────────────────

    pub fn open_create(&self) {
        self.editor.open(DomainEditor::create());
    }

    pub fn open_edit(&self, id: &DomainId) -> Result<(), CoreError> {
        let domain = self.find(id).ok_or_else(|| CoreError::NotFound {
            message: Some(format!("Domain {id} not found")),
        })?;
        self.editor
            .open(DomainEditor::edit(domain.id.clone(), DomainDraft::from(domain.as_ref())));
        Ok(())
    }

    pub fn edit_draft(&self, f: impl FnOnce(&mut DomainDraft)) {
        self.editor.update(|e| f(&mut e.draft));
    }

    pub fn close_editor(&self) {
        self.editor.close();
    }

    /// Validate and save the open editor. The dialog closes only on success.
    pub async fn save(&self) -> Result<Domain, CoreError> {
        let Some(editor) = self.editor.get() else {
            return Err(CoreError::validation("No domain is being edited"));
        };
        if let Err(err) = validation::domain_draft(&editor.draft) {
            self.notifier.validation(err.user_message(""));
            return Err(err);
        }

        let saved = match editor.editing {
            Some(id) => {
                self.domains
                    .mutate(self.gateway.update_domain(id, editor.draft), UPDATED, SAVE_FAILED)
                    .await?
            }
            None => {
                self.domains
                    .mutate(self.gateway.create_domain(editor.draft), CREATED, SAVE_FAILED)
                    .await?
            }
        };
        self.editor.close();
        Ok(saved)
    }

    // ── Delete ───────────────────────────────────────────────────────

    /// Ask for confirmation before deleting.
    pub fn request_delete(&self, id: &DomainId) -> Result<(), CoreError> {
        let domain = self.find(id).ok_or_else(|| CoreError::NotFound {
            message: Some(format!("Domain {id} not found")),
        })?;
        self.pending_delete.open(domain);
        Ok(())
    }

    pub fn cancel_delete(&self) {
        self.pending_delete.close();
    }

    pub async fn confirm_delete(&self) -> Result<(), CoreError> {
        let Some(domain) = self.pending_delete.get() else {
            return Err(CoreError::validation("No domain selected"));
        };
        self.domains
            .mutate(self.gateway.delete_domain(domain.id.clone()), DELETED, DELETE_FAILED)
            .await?;
        self.pending_delete.close();
        Ok(())
    }

    pub fn discard(&self) {
        self.domains.discard();
        self.notifier.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gateway::{
        MockAuthGateway, MockDomainGateway, MockFolderGateway, MockReportGateway,
        MockSubscriptionGateway, MockUserGroupGateway,
    };
    use crate::notify::NoticeLevel;
    use crate::screens::fixtures::domain;

    fn gateways(domains: MockDomainGateway) -> Gateways {
        Gateways {
            domains: Arc::new(domains),
            subscriptions: Arc::new(MockSubscriptionGateway::new()),
            groups: Arc::new(MockUserGroupGateway::new()),
            folders: Arc::new(MockFolderGateway::new()),
            reports: Arc::new(MockReportGateway::new()),
            auth: Arc::new(MockAuthGateway::new()),
        }
    }

    fn names(screen: &DomainManagement) -> Vec<String> {
        screen.domains().items().iter().map(|d| d.name.clone()).collect()
    }

    #[tokio::test]
    async fn create_then_collection_equals_fresh_list() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut gw = MockDomainGateway::new();
        {
            let calls = calls.clone();
            gw.expect_list_domains().returning(move || {
                // The server also picked up a record created elsewhere.
                Ok(if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    vec![domain("1", "Finance")]
                } else {
                    vec![domain("1", "Finance"), domain("2", "Credit"), domain("3", "Risk")]
                })
            });
        }
        gw.expect_create_domain()
            .withf(|d| d.name == "Credit")
            .times(1)
            .returning(|_| Ok(domain("2", "Credit")));

        let screen = DomainManagement::new(&gateways(gw), Notifier::default());
        screen.load().await.expect("load");

        screen.open_create();
        screen.edit_draft(|d| d.name = "Credit".into());
        screen.save().await.expect("save");

        assert_eq!(names(&screen), vec!["Finance", "Credit", "Risk"]);
        assert!(!screen.editor().is_open());
        assert_eq!(
            screen.notifier().current().map(|n| n.message).as_deref(),
            Some("Domain created successfully")
        );
    }

    #[tokio::test]
    async fn blank_name_never_reaches_gateway() {
        let mut gw = MockDomainGateway::new();
        gw.expect_list_domains().returning(|| Ok(vec![]));
        gw.expect_create_domain().never();

        let screen = DomainManagement::new(&gateways(gw), Notifier::default());
        screen.open_create();
        screen.edit_draft(|d| d.description = "no name".into());
        assert!(screen.save().await.is_err());

        let notice = screen.notifier().current().expect("notice");
        assert_eq!(notice.message, "Domain name is required");
        assert_eq!(notice.level, NoticeLevel::Validation);
        assert!(screen.editor().is_open());
    }

    #[tokio::test]
    async fn edit_sends_update_for_existing_id() {
        let mut gw = MockDomainGateway::new();
        gw.expect_list_domains().returning(|| Ok(vec![domain("1", "Finance")]));
        gw.expect_update_domain()
            .withf(|id, d| id.as_str() == "1" && d.name == "Finance EU")
            .times(1)
            .returning(|_, _| Ok(domain("1", "Finance EU")));

        let screen = DomainManagement::new(&gateways(gw), Notifier::default());
        screen.load().await.expect("load");
        screen.open_edit(&"1".into()).expect("edit");
        assert!(screen.editor().get().is_some_and(|e| e.is_edit()));
        screen.edit_draft(|d| d.name = "Finance EU".into());
        screen.save().await.expect("save");
        assert_eq!(
            screen.notifier().current().map(|n| n.message).as_deref(),
            Some("Domain updated successfully")
        );
    }

    #[tokio::test]
    async fn failed_save_keeps_dialog_open() {
        let mut gw = MockDomainGateway::new();
        gw.expect_list_domains().times(0);
        gw.expect_create_domain().returning(|_| {
            Err(CoreError::Server {
                status: Some(400),
                message: Some("Domain already exists".into()),
                code: None,
            })
        });

        let screen = DomainManagement::new(&gateways(gw), Notifier::default());
        screen.open_create();
        screen.edit_draft(|d| d.name = "Finance".into());
        assert!(screen.save().await.is_err());
        assert!(screen.editor().is_open());
        assert_eq!(
            screen.notifier().current().map(|n| n.message).as_deref(),
            Some("Domain already exists")
        );
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let mut gw = MockDomainGateway::new();
        gw.expect_list_domains().returning(|| Ok(vec![domain("1", "Finance")]));
        gw.expect_delete_domain()
            .withf(|id| id.as_str() == "1")
            .times(1)
            .returning(|_| Err(CoreError::Network { reason: "refused".into() }));

        let screen = DomainManagement::new(&gateways(gw), Notifier::default());
        screen.load().await.expect("load");
        screen.request_delete(&"1".into()).expect("ask");
        assert!(screen.pending_delete().is_open());
        assert!(screen.confirm_delete().await.is_err());
        assert_eq!(
            screen.notifier().current().map(|n| n.message).as_deref(),
            Some("Error deleting domain")
        );
        assert_eq!(names(&screen), vec!["Finance"]);
        assert!(screen.pending_delete().is_open());
    }

    #[tokio::test]
    async fn load_failure_uses_backend_hint() {
        let mut gw = MockDomainGateway::new();
        gw.expect_list_domains()
            .returning(|| Err(CoreError::Network { reason: "refused".into() }));

        let screen = DomainManagement::new(&gateways(gw), Notifier::default());
        assert!(screen.load().await.is_err());
        let state = screen.domains().state();
        assert!(!state.is_loading);
        assert_eq!(
            state.last_error.as_deref(),
            Some("Error loading domains. Please check if backend is running.")
        );
    }
}
