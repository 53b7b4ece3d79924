// Report viewing and download endpoints
//
// Preview and download return raw bytes (PDF or octet-stream). The URL
// builders are exposed so front-ends can hand links to an external viewer.

use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{
    BatchDownloadBody, FileRef, PresignBody, PresignResponse, ReportMetadataResponse,
};

impl ApiClient {
    // ── URL builders ─────────────────────────────────────────────────

    /// `GET /api/reports/preview?folder=&fileName=`
    pub fn preview_url(&self, folder: &str, file_name: &str) -> Result<Url, Error> {
        self.endpoint_with_query(
            &["api", "reports", "preview"],
            &[("folder", folder), ("fileName", file_name)],
        )
    }

    /// `GET /api/files/download?folder=&fileName=`
    pub fn download_url(&self, folder: &str, file_name: &str) -> Result<Url, Error> {
        self.endpoint_with_query(
            &["api", "files", "download"],
            &[("folder", folder), ("fileName", file_name)],
        )
    }

    // ── Fetches ──────────────────────────────────────────────────────

    /// `GET /api/reports/metadata?folder=&fileName=`
    pub async fn report_metadata(
        &self,
        folder: &str,
        file_name: &str,
    ) -> Result<ReportMetadataResponse, Error> {
        let url = self.endpoint_with_query(
            &["api", "reports", "metadata"],
            &[("folder", folder), ("fileName", file_name)],
        )?;
        self.get(url).await
    }

    /// Fetch the inline preview stream.
    pub async fn preview_report(&self, folder: &str, file_name: &str) -> Result<Bytes, Error> {
        self.get_bytes(self.preview_url(folder, file_name)?).await
    }

    /// Fetch the file as an attachment download.
    pub async fn download_report(&self, folder: &str, file_name: &str) -> Result<Bytes, Error> {
        debug!(folder, file_name, "downloading report");
        self.get_bytes(self.download_url(folder, file_name)?).await
    }

    /// `POST /api/files/download/batch`; returns a zip archive.
    pub async fn download_batch(&self, files: Vec<FileRef>, zip_name: &str) -> Result<Bytes, Error> {
        debug!(count = files.len(), zip_name, "downloading report batch");
        let body = BatchDownloadBody {
            files,
            zip_name: zip_name.to_owned(),
        };
        self.post_bytes(self.api(&["files", "download", "batch"])?, &body)
            .await
    }

    /// `POST /reports/{id}/presign`: a streaming URL for an inline viewer.
    pub async fn presign_report(
        &self,
        report_id: &str,
        body: &PresignBody,
    ) -> Result<PresignResponse, Error> {
        self.post(self.endpoint(&["reports", report_id, "presign"])?, body)
            .await
    }
}
