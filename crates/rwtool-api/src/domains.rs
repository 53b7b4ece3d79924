// Domain endpoints
//
// Domains are the report categories subscribers request access to.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{DomainBody, DomainResponse};

impl ApiClient {
    /// `GET /api/domains`
    pub async fn list_domains(&self) -> Result<Vec<DomainResponse>, Error> {
        self.get(self.api(&["domains"])?).await
    }

    /// `GET /api/domains/{id}`
    pub async fn get_domain(&self, id: &str) -> Result<DomainResponse, Error> {
        self.get(self.api(&["domains", id])?).await
    }

    /// `POST /api/domains` with `{name, description}`
    pub async fn create_domain(&self, body: &DomainBody) -> Result<DomainResponse, Error> {
        debug!(name = %body.name, "creating domain");
        self.post(self.api(&["domains"])?, body).await
    }

    /// `PUT /api/domains/{id}` with `{name, description}`
    pub async fn update_domain(&self, id: &str, body: &DomainBody) -> Result<DomainResponse, Error> {
        debug!(id, name = %body.name, "updating domain");
        self.put(self.api(&["domains", id])?, body).await
    }

    /// `DELETE /api/domains/{id}`
    pub async fn delete_domain(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting domain");
        self.delete(self.api(&["domains", id])?).await
    }
}
