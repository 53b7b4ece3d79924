// ── Report viewer ──
//
// Files the session user can see, their favorites, and the links and
// downloads for a chosen report. Downloads come back as bytes; writing
// them to disk is up to the caller.

use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::watch;
use tracing::{info, warn};
use url::Url;

use super::{FilterState, Slot};
use crate::error::CoreError;
use crate::gateway::{Gateways, ReportGateway};
use crate::model::{ReportFile, ReportMetadata, ReportRef};
use crate::notify::Notifier;
use crate::projection::{Searchable, project};
use crate::session::Session;
use crate::sync::SyncController;
use crate::validation;

const LOAD_FAILED: &str = "Error loading reports";
const FAVORITES_FAILED: &str = "Failed to load favorites";
const FAVORITE_ADDED: &str = "Added to favorites";
const FAVORITE_REMOVED: &str = "Removed from favorites";
const FAVORITE_ADD_FAILED: &str = "Failed to add favorite";
const FAVORITE_REMOVE_FAILED: &str = "Failed to remove favorite";
const DOWNLOAD_FAILED: &str = "Failed to download report";
const BATCH_FAILED: &str = "Failed to download selected reports";
const PREVIEW_FAILED: &str = "Failed to get preview URL";
const NOTHING_SELECTED: &str = "Select at least one report";

/// Default archive name for batch downloads.
pub const DEFAULT_ZIP_NAME: &str = "reports.zip";

impl Searchable for ReportFile {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.file_name.as_str(), self.folder.as_str()]
    }
}

/// A report opened for viewing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenReport {
    pub reference: ReportRef,
    pub preview_url: Url,
    pub download_url: Url,
    /// Filled in once the metadata call returns.
    pub metadata: Option<ReportMetadata>,
}

pub struct ReportViewer {
    notifier: Notifier,
    session: Session,
    files: SyncController<ReportFile>,
    favorites: SyncController<ReportRef>,
    gateway: Arc<dyn ReportGateway>,
    filter: FilterState,
    selection: watch::Sender<BTreeSet<ReportRef>>,
    open: Slot<OpenReport>,
}

impl ReportViewer {
    pub fn new(gateways: &Gateways, notifier: Notifier, session: Session) -> Self {
        let gateway = Arc::clone(&gateways.reports);

        let loader = Arc::clone(&gateways.folders);
        let email = session.email.clone();
        let files = SyncController::new("report_files", LOAD_FAILED, notifier.clone(), move || {
            let gw = Arc::clone(&loader);
            let email = email.clone();
            async move { gw.user_files(email).await }
        });
        let loader = Arc::clone(&gateway);
        let email = session.email.clone();
        let favorites = SyncController::new("favorites", FAVORITES_FAILED, notifier.clone(), move || {
            let gw = Arc::clone(&loader);
            let email = email.clone();
            async move { gw.favorites(email).await }
        });

        Self {
            notifier,
            session,
            files,
            favorites,
            gateway,
            filter: FilterState::default(),
            selection: watch::channel(BTreeSet::new()).0,
            open: Slot::default(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn files(&self) -> &SyncController<ReportFile> {
        &self.files
    }

    pub fn favorites(&self) -> &SyncController<ReportRef> {
        &self.favorites
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn opened(&self) -> &Slot<OpenReport> {
        &self.open
    }

    pub async fn load(&self) -> Result<(), CoreError> {
        let (files, favorites) = tokio::join!(self.files.refresh(), self.favorites.refresh());
        files.and(favorites)
    }

    pub fn visible(&self) -> Vec<Arc<ReportFile>> {
        let filter = self.filter.get();
        project(&self.files.items(), &filter.search, &filter.status)
    }

    pub fn is_favorite(&self, report: &ReportRef) -> bool {
        self.favorites.items().iter().any(|f| f.as_ref() == report)
    }

    fn check(&self, report: &ReportRef) -> Result<(), CoreError> {
        validation::report_ref(report).inspect_err(|e| self.notifier.validation(e.user_message("")))
    }

    // ── Viewing ──────────────────────────────────────────────────────

    /// Open a report: build its preview and download links, then fetch
    /// its metadata. A metadata failure leaves the report open without it.
    pub async fn open(&self, report: &ReportRef) -> Result<OpenReport, CoreError> {
        self.check(report)?;
        let preview_url = self.gateway.preview_url(report)?;
        let download_url = self.gateway.download_url(report)?;
        self.open.open(OpenReport {
            reference: report.clone(),
            preview_url,
            download_url,
            metadata: None,
        });

        match self.gateway.metadata(report.clone()).await {
            Ok(meta) => self.open.update(|o| {
                if &o.reference == report {
                    o.metadata = Some(meta);
                }
            }),
            Err(err) => warn!(error = %err, file = %report.file_name, "metadata unavailable"),
        }
        self.open.get().ok_or(CoreError::Discarded)
    }

    pub fn close(&self) {
        self.open.close();
    }

    /// Short-lived direct link for viewing a report outside the console.
    pub async fn presign(&self, report_id: &str, report: &ReportRef) -> Result<String, CoreError> {
        self.check(report)?;
        self.gateway
            .presign(report_id.to_owned(), self.session.email.clone(), report.clone())
            .await
            .inspect_err(|e| self.notifier.error(e.user_message(PREVIEW_FAILED)))
    }

    // ── Favorites ────────────────────────────────────────────────────

    /// Add or remove a favorite, then re-fetch the favorites list.
    /// Returns whether the report is now a favorite.
    pub async fn toggle_favorite(&self, report: &ReportRef) -> Result<bool, CoreError> {
        self.check(report)?;
        let user = self.session.email.clone();
        if self.is_favorite(report) {
            self.favorites
                .mutate(
                    self.gateway.remove_favorite(user, report.clone()),
                    FAVORITE_REMOVED,
                    FAVORITE_REMOVE_FAILED,
                )
                .await?;
            Ok(false)
        } else {
            self.favorites
                .mutate(
                    self.gateway.add_favorite(user, report.clone()),
                    FAVORITE_ADDED,
                    FAVORITE_ADD_FAILED,
                )
                .await?;
            Ok(true)
        }
    }

    // ── Selection & downloads ────────────────────────────────────────

    pub fn selection(&self) -> BTreeSet<ReportRef> {
        self.selection.borrow().clone()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<BTreeSet<ReportRef>> {
        self.selection.subscribe()
    }

    pub fn toggle_selected(&self, report: &ReportRef) {
        self.selection.send_modify(|s| {
            if !s.remove(report) {
                s.insert(report.clone());
            }
        });
    }

    pub fn clear_selection(&self) {
        self.selection.send_modify(BTreeSet::clear);
    }

    pub async fn download(&self, report: &ReportRef) -> Result<Bytes, CoreError> {
        self.check(report)?;
        let bytes = self
            .gateway
            .download(report.clone())
            .await
            .inspect_err(|e| self.notifier.error(e.user_message(DOWNLOAD_FAILED)))?;
        info!(file = %report.file_name, bytes = bytes.len(), "report downloaded");
        Ok(bytes)
    }

    /// Download the selection as one zip archive and clear the selection.
    pub async fn download_selected(&self, zip_name: Option<&str>) -> Result<Bytes, CoreError> {
        let selected: Vec<ReportRef> = self.selection().into_iter().collect();
        if selected.is_empty() {
            self.notifier.validation(NOTHING_SELECTED);
            return Err(CoreError::validation(NOTHING_SELECTED));
        }
        let zip_name = zip_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_ZIP_NAME)
            .to_owned();
        let count = selected.len();
        let bytes = self
            .gateway
            .download_batch(selected, zip_name)
            .await
            .inspect_err(|e| self.notifier.error(e.user_message(BATCH_FAILED)))?;
        info!(count, bytes = bytes.len(), "batch downloaded");
        self.clear_selection();
        Ok(bytes)
    }

    pub fn discard(&self) {
        self.files.discard();
        self.favorites.discard();
        self.notifier.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use serde_json::Map;

    use super::*;
    use crate::gateway::{
        MockAuthGateway, MockDomainGateway, MockFolderGateway, MockReportGateway,
        MockSubscriptionGateway, MockUserGroupGateway,
    };
    use crate::notify::NoticeLevel;
    use crate::screens::fixtures::subscriber;

    fn file(folder: &str, name: &str) -> ReportFile {
        ReportFile {
            file_name: name.into(),
            folder: folder.into(),
            size: Some(1024),
            last_modified: None,
            extra: Map::new(),
        }
    }

    fn viewer(reports: MockReportGateway) -> ReportViewer {
        let mut folders = MockFolderGateway::new();
        folders
            .expect_user_files()
            .withf(|email| email == "ann@corp.com")
            .returning(|_| Ok(vec![file("Finance", "q1 close.pdf"), file("Risk", "var.pdf")]));
        let gateways = Gateways {
            domains: Arc::new(MockDomainGateway::new()),
            subscriptions: Arc::new(MockSubscriptionGateway::new()),
            groups: Arc::new(MockUserGroupGateway::new()),
            folders: Arc::new(folders),
            reports: Arc::new(reports),
            auth: Arc::new(MockAuthGateway::new()),
        };
        ReportViewer::new(&gateways, Notifier::default(), subscriber())
    }

    #[tokio::test]
    async fn missing_file_info_is_local() {
        let mut reports = MockReportGateway::new();
        reports.expect_preview_url().never();
        reports.expect_download().never();

        let viewer = viewer(reports);
        let blank = ReportRef::new("Finance", " ");
        assert!(viewer.open(&blank).await.is_err());
        assert!(viewer.download(&blank).await.is_err());

        let notice = viewer.notifier().current().expect("notice");
        assert_eq!(notice.message, "Missing file information");
        assert_eq!(notice.level, NoticeLevel::Validation);
    }

    #[tokio::test]
    async fn open_builds_links_and_metadata() {
        let mut reports = MockReportGateway::new();
        reports.expect_preview_url().returning(|r| {
            Ok(Url::parse(&format!("http://localhost:8080/api/reports/preview?f={}", r.file_name))
                .expect("url"))
        });
        reports
            .expect_download_url()
            .returning(|_| Ok(Url::parse("http://localhost:8080/api/files/download").expect("url")));
        reports.expect_metadata().returning(|r| {
            Ok(ReportMetadata {
                reference: r,
                size: 2048,
                content_type: Some("application/pdf".into()),
                exists: true,
            })
        });

        let viewer = viewer(reports);
        let opened = viewer
            .open(&ReportRef::new("Finance", "q1.pdf"))
            .await
            .expect("open");
        assert_eq!(opened.metadata.map(|m| m.size), Some(2048));
        assert!(viewer.opened().is_open());
        viewer.close();
        assert!(!viewer.opened().is_open());
    }

    #[tokio::test]
    async fn toggle_favorite_round_trips_through_server() {
        let favs: Arc<Mutex<Vec<ReportRef>>> = Arc::new(Mutex::new(vec![]));
        let mut reports = MockReportGateway::new();
        {
            let favs = favs.clone();
            reports
                .expect_favorites()
                .returning(move |_| Ok(favs.lock().expect("lock").clone()));
        }
        {
            let favs = favs.clone();
            reports
                .expect_add_favorite()
                .withf(|user, _| user == "ann@corp.com")
                .times(1)
                .returning(move |_, r| {
                    favs.lock().expect("lock").push(r);
                    Ok(())
                });
        }
        {
            let favs = favs.clone();
            reports.expect_remove_favorite().times(1).returning(move |_, r| {
                favs.lock().expect("lock").retain(|f| f != &r);
                Ok(())
            });
        }

        let viewer = viewer(reports);
        viewer.load().await.expect("load");
        let report = ReportRef::new("Risk", "var.pdf");

        assert!(viewer.toggle_favorite(&report).await.expect("add"));
        assert!(viewer.is_favorite(&report));
        assert_eq!(
            viewer.notifier().current().map(|n| n.message).as_deref(),
            Some("Added to favorites")
        );

        assert!(!viewer.toggle_favorite(&report).await.expect("remove"));
        assert!(!viewer.is_favorite(&report));
    }

    #[tokio::test]
    async fn batch_download_uses_selection() {
        let mut reports = MockReportGateway::new();
        reports
            .expect_download_batch()
            .withf(|files, zip| files.len() == 2 && zip == "reports.zip")
            .times(1)
            .returning(|_, _| Ok(Bytes::from_static(b"PK")));

        let viewer = viewer(reports);
        viewer.load_files_only().await;
        assert!(viewer.download_selected(None).await.is_err());

        for f in viewer.visible() {
            viewer.toggle_selected(&f.reference());
        }
        let bytes = viewer.download_selected(Some("  ")).await.expect("zip");
        assert_eq!(&bytes[..], b"PK");
        assert!(viewer.selection().is_empty());
    }

    #[tokio::test]
    async fn download_failure_notice() {
        let mut reports = MockReportGateway::new();
        reports
            .expect_download()
            .returning(|_| Err(CoreError::Network { reason: "reset".into() }));

        let viewer = viewer(reports);
        assert!(viewer.download(&ReportRef::new("Risk", "var.pdf")).await.is_err());
        assert_eq!(
            viewer.notifier().current().map(|n| n.message).as_deref(),
            Some("Failed to download report")
        );
    }

    #[tokio::test]
    async fn search_by_file_or_folder() {
        let viewer = viewer(MockReportGateway::new());
        viewer.load_files_only().await;
        viewer.filter().set_search("RISK");
        let names: Vec<_> = viewer.visible().iter().map(|f| f.file_name.clone()).collect();
        assert_eq!(names, vec!["var.pdf"]);
    }

    impl ReportViewer {
        async fn load_files_only(&self) {
            self.files.refresh().await.expect("files");
        }
    }
}
