// ── My subscriptions (subscriber) ──

use std::sync::Arc;

use super::FilterState;
use crate::error::CoreError;
use crate::gateway::Gateways;
use crate::model::SubscriptionRequest;
use crate::notify::Notifier;
use crate::projection::{Searchable, own_request_fields, project_with};
use crate::session::Session;
use crate::sync::SyncController;

const LOAD_FAILED: &str = "Error loading subscriptions";

pub const STATUS_CHOICES: [&str; 3] = ["Pending", "Approved", "Rejected"];

/// The session user's own requests and their review outcome.
pub struct MySubscriptions {
    notifier: Notifier,
    session: Session,
    requests: SyncController<SubscriptionRequest>,
    filter: FilterState,
}

impl MySubscriptions {
    pub fn new(gateways: &Gateways, notifier: Notifier, session: Session) -> Self {
        let loader = Arc::clone(&gateways.subscriptions);
        let email = session.email.clone();
        let requests = SyncController::new("my_requests", LOAD_FAILED, notifier.clone(), move || {
            let gw = Arc::clone(&loader);
            let email = email.clone();
            async move { gw.list_for_user(email).await }
        });
        Self {
            notifier,
            session,
            requests,
            filter: FilterState::default(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn requests(&self) -> &SyncController<SubscriptionRequest> {
        &self.requests
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub async fn load(&self) -> Result<(), CoreError> {
        self.requests.refresh().await
    }

    /// Requests matching the search (domain or rejection reason) and status.
    pub fn visible(&self) -> Vec<Arc<SubscriptionRequest>> {
        let filter = self.filter.get();
        project_with(
            &self.requests.items(),
            &filter.search,
            &filter.status,
            own_request_fields,
            SubscriptionRequest::status,
        )
    }

    pub fn discard(&self) {
        self.requests.discard();
        self.notifier.dismiss();
    }
}
