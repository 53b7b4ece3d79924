// User group endpoints
//
// Groups map an Active Directory group to a domain and a set of report
// folders. Membership is managed per email.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{UserGroupBody, UserGroupResponse};

impl ApiClient {
    /// `GET /api/user-groups`
    pub async fn list_user_groups(&self) -> Result<Vec<UserGroupResponse>, Error> {
        self.get(self.api(&["user-groups"])?).await
    }

    /// `GET /api/user-groups/{id}`
    pub async fn get_user_group(&self, id: i64) -> Result<UserGroupResponse, Error> {
        self.get(self.api(&["user-groups", &id.to_string()])?).await
    }

    /// `GET /api/user-groups/user/{email}`
    pub async fn list_groups_for_user(&self, email: &str) -> Result<Vec<UserGroupResponse>, Error> {
        self.get(self.api(&["user-groups", "user", email])?).await
    }

    /// `GET /api/user-groups/user/{email}/folders`
    pub async fn list_folders_for_user(&self, email: &str) -> Result<Vec<String>, Error> {
        self.get(self.api(&["user-groups", "user", email, "folders"])?)
            .await
    }

    /// `POST /api/user-groups`
    pub async fn create_user_group(&self, body: &UserGroupBody) -> Result<UserGroupResponse, Error> {
        debug!(group = %body.ad_group_name, "creating user group");
        self.post(self.api(&["user-groups"])?, body).await
    }

    /// `PUT /api/user-groups/{id}`
    pub async fn update_user_group(
        &self,
        id: i64,
        body: &UserGroupBody,
    ) -> Result<UserGroupResponse, Error> {
        debug!(id, group = %body.ad_group_name, "updating user group");
        self.put(self.api(&["user-groups", &id.to_string()])?, body)
            .await
    }

    /// `DELETE /api/user-groups/{id}`
    pub async fn delete_user_group(&self, id: i64) -> Result<(), Error> {
        debug!(id, "deleting user group");
        self.delete(self.api(&["user-groups", &id.to_string()])?)
            .await
    }

    /// `POST /api/user-groups/{id}/members` with the bare email as body
    pub async fn add_group_member(&self, id: i64, email: &str) -> Result<UserGroupResponse, Error> {
        debug!(id, email, "adding group member");
        self.post_text(
            self.api(&["user-groups", &id.to_string(), "members"])?,
            email.to_owned(),
        )
        .await
    }

    /// `DELETE /api/user-groups/{id}/members/{email}`
    pub async fn remove_group_member(
        &self,
        id: i64,
        email: &str,
    ) -> Result<UserGroupResponse, Error> {
        debug!(id, email, "removing group member");
        self.delete_with_response(self.api(&["user-groups", &id.to_string(), "members", email])?)
            .await
    }
}
