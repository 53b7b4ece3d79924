// Per-user favorite reports

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{FavoriteBody, FavoritesResponse, FileRef};

impl ApiClient {
    /// `GET /api/favorites?userId=`
    pub async fn list_favorites(&self, user_id: &str) -> Result<Vec<FileRef>, Error> {
        let url = self.endpoint_with_query(&["api", "favorites"], &[("userId", user_id)])?;
        let resp: FavoritesResponse = self.get(url).await?;
        Ok(resp.favorites)
    }

    /// `POST /api/favorites`
    pub async fn add_favorite(&self, body: &FavoriteBody) -> Result<(), Error> {
        self.post_no_response(self.api(&["favorites"])?, body).await
    }

    /// `DELETE /api/favorites` (body carries the file reference)
    pub async fn remove_favorite(&self, body: &FavoriteBody) -> Result<(), Error> {
        self.delete_with_body(self.api(&["favorites"])?, body).await
    }
}
