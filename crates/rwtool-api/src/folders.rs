// Report folder endpoints (read-only)

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::ReportFileResponse;

impl ApiClient {
    /// `GET /api/folders`: folder names under the reports root.
    pub async fn list_folders(&self) -> Result<Vec<String>, Error> {
        self.get(self.api(&["folders"])?).await
    }

    /// `GET /api/folders/{name}/files`
    pub async fn list_folder_files(&self, folder: &str) -> Result<Vec<ReportFileResponse>, Error> {
        self.get(self.api(&["folders", folder, "files"])?).await
    }

    /// `GET /api/folders/user/{email}/files`: every file the user's groups grant.
    pub async fn list_user_files(&self, email: &str) -> Result<Vec<ReportFileResponse>, Error> {
        self.get(self.api(&["folders", "user", email, "files"])?)
            .await
    }
}
