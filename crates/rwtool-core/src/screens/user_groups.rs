// ── User group access ──

use std::sync::Arc;

use super::{Editor, FilterState, Slot};
use crate::error::CoreError;
use crate::gateway::{Gateways, UserGroupGateway};
use crate::model::{Domain, Folder, GroupId, UserGroup, UserGroupDraft};
use crate::notify::Notifier;
use crate::projection::project;
use crate::sync::SyncController;
use crate::validation;

const LOAD_FAILED: &str = "Error loading user groups";
const FOLDERS_FAILED: &str = "Error loading folders";
const DOMAINS_FAILED: &str = "Error loading domains";
const CREATED: &str = "User group created successfully";
const UPDATED: &str = "User group updated successfully";
const SAVE_FAILED: &str = "Error saving user group";
const DELETED: &str = "User group deleted successfully";
const DELETE_FAILED: &str = "Error deleting user group";

pub type GroupEditor = Editor<GroupId, UserGroupDraft>;

/// Maps AD groups to report folders and a domain.
pub struct UserGroupAccess {
    notifier: Notifier,
    groups: SyncController<UserGroup>,
    folders: SyncController<Folder>,
    domains: SyncController<Domain>,
    gateway: Arc<dyn UserGroupGateway>,
    filter: FilterState,
    editor: Slot<GroupEditor>,
    pending_delete: Slot<Arc<UserGroup>>,
}

impl UserGroupAccess {
    pub fn new(gateways: &Gateways, notifier: Notifier) -> Self {
        let gateway = Arc::clone(&gateways.groups);

        let loader = Arc::clone(&gateway);
        let groups = SyncController::new("user_groups", LOAD_FAILED, notifier.clone(), move || {
            let gw = Arc::clone(&loader);
            async move { gw.list_groups().await }
        });
        let loader = Arc::clone(&gateways.folders);
        let folders = SyncController::new("folders", FOLDERS_FAILED, notifier.clone(), move || {
            let gw = Arc::clone(&loader);
            async move { gw.list_folders().await }
        });
        let loader = Arc::clone(&gateways.domains);
        let domains = SyncController::new("domains", DOMAINS_FAILED, notifier.clone(), move || {
            let gw = Arc::clone(&loader);
            async move { gw.list_domains().await }
        });

        Self {
            notifier,
            groups,
            folders,
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

    pub fn groups(&self) -> &SyncController<UserGroup> {
        &self.groups
    }

    pub fn folders(&self) -> &SyncController<Folder> {
        &self.folders
    }

    pub fn domains(&self) -> &SyncController<Domain> {
        &self.domains
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn editor(&self) -> &Slot<GroupEditor> {
        &self.editor
    }

    pub fn pending_delete(&self) -> &Slot<Arc<UserGroup>> {
        &self.pending_delete
    }

    /// Load groups, folders and domains concurrently. Each failure is
    /// reported on its own; the first error is returned.
    pub async fn load(&self) -> Result<(), CoreError> {
        let (groups, folders, domains) =
            tokio::join!(self.groups.refresh(), self.folders.refresh(), self.domains.refresh());
        groups.and(folders).and(domains)
    }

    pub fn visible(&self) -> Vec<Arc<UserGroup>> {
        let filter = self.filter.get();
        project(&self.groups.items(), &filter.search, &filter.status)
    }

    fn find(&self, id: GroupId) -> Result<Arc<UserGroup>, CoreError> {
        self.groups
            .items()
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                message: Some(format!("User group {id} not found")),
            })
    }

    // ── Create / edit ────────────────────────────────────────────────

    pub fn open_create(&self) {
        self.editor.open(GroupEditor::create());
    }

    pub fn open_edit(&self, id: GroupId) -> Result<(), CoreError> {
        let group = self.find(id)?;
        self.editor
            .open(GroupEditor::edit(group.id, UserGroupDraft::from(group.as_ref())));
        Ok(())
    }

    pub fn edit_draft(&self, f: impl FnOnce(&mut UserGroupDraft)) {
        self.editor.update(|e| f(&mut e.draft));
    }

    pub fn toggle_folder(&self, folder: &str) {
        self.edit_draft(|d| d.toggle_folder(folder));
    }

    pub fn close_editor(&self) {
        self.editor.close();
    }

    pub async fn save(&self) -> Result<UserGroup, CoreError> {
        let Some(editor) = self.editor.get() else {
            return Err(CoreError::validation("No user group is being edited"));
        };
        if let Err(err) = validation::user_group_draft(&editor.draft) {
            self.notifier.validation(err.user_message(""));
            return Err(err);
        }

        let saved = match editor.editing {
            Some(id) => {
                self.groups
                    .mutate(self.gateway.update_group(id, editor.draft), UPDATED, SAVE_FAILED)
                    .await?
            }
            None => {
                self.groups
                    .mutate(self.gateway.create_group(editor.draft), CREATED, SAVE_FAILED)
                    .await?
            }
        };
        self.editor.close();
        Ok(saved)
    }

    // ── Delete ───────────────────────────────────────────────────────

    pub fn request_delete(&self, id: GroupId) -> Result<(), CoreError> {
        self.pending_delete.open(self.find(id)?);
        Ok(())
    }

    pub fn cancel_delete(&self) {
        self.pending_delete.close();
    }

    pub async fn confirm_delete(&self) -> Result<(), CoreError> {
        let Some(group) = self.pending_delete.get() else {
            return Err(CoreError::validation("No user group selected"));
        };
        self.groups
            .mutate(self.gateway.delete_group(group.id), DELETED, DELETE_FAILED)
            .await?;
        self.pending_delete.close();
        Ok(())
    }

    pub fn discard(&self) {
        self.groups.discard();
        self.folders.discard();
        self.domains.discard();
        self.notifier.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gateway::{
        MockAuthGateway, MockDomainGateway, MockFolderGateway, MockReportGateway,
        MockSubscriptionGateway, MockUserGroupGateway,
    };
    use crate::notify::NoticeLevel;
    use crate::screens::fixtures::{domain, group};
    use crate::validation::GROUP_FIELDS_REQUIRED;

    fn gateways(groups: MockUserGroupGateway, folders: MockFolderGateway) -> Gateways {
        let mut domains = MockDomainGateway::new();
        domains
            .expect_list_domains()
            .returning(|| Ok(vec![domain("1", "Finance")]));
        Gateways {
            domains: Arc::new(domains),
            subscriptions: Arc::new(MockSubscriptionGateway::new()),
            groups: Arc::new(groups),
            folders: Arc::new(folders),
            reports: Arc::new(MockReportGateway::new()),
            auth: Arc::new(MockAuthGateway::new()),
        }
    }

    fn folders(names: &'static [&'static str]) -> MockFolderGateway {
        let mut gw = MockFolderGateway::new();
        gw.expect_list_folders()
            .returning(move || Ok(names.iter().map(|n| Folder((*n).to_owned())).collect()));
        gw
    }

    #[tokio::test]
    async fn group_without_folders_is_rejected_locally() {
        let mut gw = MockUserGroupGateway::new();
        gw.expect_list_groups().returning(|| Ok(vec![]));
        gw.expect_create_group().never();
        gw.expect_update_group().never();

        let screen = UserGroupAccess::new(&gateways(gw, folders(&["Finance"])), Notifier::default());
        screen.load().await.expect("load");
        screen.open_create();
        screen.edit_draft(|d| {
            d.ad_group_name = "Compliance".into();
            d.associated_domain = "Finance".into();
        });

        let err = screen.save().await.expect_err("no folders");
        assert!(matches!(err, CoreError::Validation { .. }));
        let notice = screen.notifier().current().expect("notice");
        assert_eq!(notice.message, GROUP_FIELDS_REQUIRED);
        assert_eq!(notice.level, NoticeLevel::Validation);
        assert!(screen.editor().is_open());
    }

    #[tokio::test]
    async fn create_with_toggled_folders() {
        let mut gw = MockUserGroupGateway::new();
        gw.expect_list_groups().returning(|| Ok(vec![group(7, "Compliance", &["Finance"])]));
        gw.expect_create_group()
            .withf(|d| d.ad_group_name == "Compliance" && d.folder_access == ["Finance"])
            .times(1)
            .returning(|_| Ok(group(7, "Compliance", &["Finance"])));

        let screen = UserGroupAccess::new(
            &gateways(gw, folders(&["Finance", "HR"])),
            Notifier::default(),
        );
        screen.load().await.expect("load");
        assert_eq!(screen.folders().items().len(), 2);

        screen.open_create();
        screen.edit_draft(|d| {
            d.ad_group_name = "Compliance".into();
            d.associated_domain = "Finance".into();
        });
        screen.toggle_folder("Finance");
        screen.toggle_folder("HR");
        screen.toggle_folder("HR");
        screen.save().await.expect("save");

        assert!(!screen.editor().is_open());
        assert_eq!(
            screen.notifier().current().map(|n| n.message).as_deref(),
            Some("User group created successfully")
        );
        assert_eq!(screen.groups().items().len(), 1);
    }

    #[tokio::test]
    async fn edit_prefills_draft_and_updates() {
        let mut gw = MockUserGroupGateway::new();
        gw.expect_list_groups()
            .returning(|| Ok(vec![group(3, "Auditors", &["Finance", "Risk"])]));
        gw.expect_update_group()
            .withf(|id, d| *id == GroupId(3) && d.folder_access == ["Risk"])
            .times(1)
            .returning(|_, _| Ok(group(3, "Auditors", &["Risk"])));

        let screen = UserGroupAccess::new(&gateways(gw, folders(&[])), Notifier::default());
        screen.load().await.expect("load");
        screen.open_edit(GroupId(3)).expect("edit");
        let draft = screen.editor().get().expect("open").draft;
        assert_eq!(draft.associated_domain, "Finance");

        screen.toggle_folder("Finance");
        screen.save().await.expect("save");
        assert_eq!(
            screen.notifier().current().map(|n| n.message).as_deref(),
            Some("User group updated successfully")
        );
    }

    #[tokio::test]
    async fn folder_failure_keeps_groups() {
        let mut gw = MockUserGroupGateway::new();
        gw.expect_list_groups().returning(|| Ok(vec![group(1, "Ops", &["HR"])]));
        let mut fs = MockFolderGateway::new();
        fs.expect_list_folders()
            .returning(|| Err(CoreError::Network { reason: "refused".into() }));

        let screen = UserGroupAccess::new(&gateways(gw, fs), Notifier::default());
        assert!(screen.load().await.is_err());
        assert_eq!(screen.groups().items().len(), 1);
        assert_eq!(screen.folders().last_error().as_deref(), Some("Error loading folders"));
    }

    #[tokio::test]
    async fn delete_and_search() {
        let mut gw = MockUserGroupGateway::new();
        gw.expect_list_groups().returning(|| {
            Ok(vec![group(1, "Auditors", &["Finance"]), group(2, "Traders", &["Markets"])])
        });
        gw.expect_delete_group()
            .withf(|id| *id == GroupId(2))
            .times(1)
            .returning(|_| Ok(()));

        let screen = UserGroupAccess::new(&gateways(gw, folders(&[])), Notifier::default());
        screen.load().await.expect("load");

        screen.filter().set_search("market");
        let visible: Vec<_> = screen.visible().iter().map(|g| g.id).collect();
        assert_eq!(visible, vec![GroupId(2)]);

        screen.request_delete(GroupId(2)).expect("ask");
        screen.confirm_delete().await.expect("delete");
        assert!(!screen.pending_delete().is_open());
        assert_eq!(
            screen.notifier().current().map(|n| n.message).as_deref(),
            Some("User group deleted successfully")
        );
    }

    #[tokio::test]
    async fn failed_delete_keeps_confirmation_open() {
        let mut gw = MockUserGroupGateway::new();
        gw.expect_list_groups()
            .times(1)
            .returning(|| Ok(vec![group(4, "Auditors", &["Finance"])]));
        gw.expect_delete_group().times(1).returning(|_| {
            Err(CoreError::Server { status: Some(500), message: None, code: None })
        });

        let screen = UserGroupAccess::new(&gateways(gw, folders(&[])), Notifier::default());
        screen.load().await.expect("load");
        screen.request_delete(GroupId(4)).expect("ask");
        assert!(screen.confirm_delete().await.is_err());

        assert!(screen.pending_delete().is_open());
        assert_eq!(screen.groups().items().len(), 1);
        assert_eq!(
            screen.notifier().current().map(|n| n.message).as_deref(),
            Some("Error deleting user group")
        );
    }
}
