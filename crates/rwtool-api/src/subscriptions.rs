// Subscription request endpoints
//
// Subscribers create and cancel requests; administrators approve,
// reject, or review them. Status transitions are enforced server-side.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{
    RejectBody, ReviewBody, SubscriptionCreateBody, SubscriptionResponse,
    SubscriptionStatsResponse,
};

impl ApiClient {
    /// `GET /api/subscriptions`
    pub async fn list_subscriptions(&self) -> Result<Vec<SubscriptionResponse>, Error> {
        self.get(self.api(&["subscriptions"])?).await
    }

    /// `GET /api/subscriptions/pending`
    pub async fn list_pending_subscriptions(&self) -> Result<Vec<SubscriptionResponse>, Error> {
        self.get(self.api(&["subscriptions", "pending"])?).await
    }

    /// `GET /api/subscriptions/user/{email}`
    pub async fn list_user_subscriptions(
        &self,
        email: &str,
    ) -> Result<Vec<SubscriptionResponse>, Error> {
        self.get(self.api(&["subscriptions", "user", email])?).await
    }

    /// `GET /api/subscriptions/{id}`
    pub async fn get_subscription(&self, id: &str) -> Result<SubscriptionResponse, Error> {
        self.get(self.api(&["subscriptions", id])?).await
    }

    /// `POST /api/subscriptions`
    pub async fn create_subscription(
        &self,
        body: &SubscriptionCreateBody,
    ) -> Result<SubscriptionResponse, Error> {
        debug!(domain = %body.domain_name, user = %body.user_email, "creating subscription request");
        self.post(self.api(&["subscriptions"])?, body).await
    }

    /// `PUT /api/subscriptions/{id}/approve`
    pub async fn approve_subscription(&self, id: &str) -> Result<SubscriptionResponse, Error> {
        debug!(id, "approving subscription request");
        self.put_no_body(self.api(&["subscriptions", id, "approve"])?)
            .await
    }

    /// `PUT /api/subscriptions/{id}/reject` with `{rejectionReason}`
    pub async fn reject_subscription(
        &self,
        id: &str,
        reason: &str,
    ) -> Result<SubscriptionResponse, Error> {
        debug!(id, reason, "rejecting subscription request");
        let body = RejectBody {
            rejection_reason: reason.to_owned(),
        };
        self.put(self.api(&["subscriptions", id, "reject"])?, &body)
            .await
    }

    /// `PUT /api/subscriptions/{id}/review` with `{action, rejectionReason}`
    pub async fn review_subscription(
        &self,
        id: &str,
        body: &ReviewBody,
    ) -> Result<SubscriptionResponse, Error> {
        debug!(id, action = %body.action, "reviewing subscription request");
        self.put(self.api(&["subscriptions", id, "review"])?, body)
            .await
    }

    /// `DELETE /api/subscriptions/{id}/cancel?userEmail={email}`
    pub async fn cancel_subscription(&self, id: &str, user_email: &str) -> Result<(), Error> {
        debug!(id, user_email, "cancelling subscription request");
        let url = self.endpoint_with_query(
            &["api", "subscriptions", id, "cancel"],
            &[("userEmail", user_email)],
        )?;
        self.delete(url).await
    }

    /// `GET /api/subscriptions/stats`
    pub async fn subscription_stats(&self) -> Result<SubscriptionStatsResponse, Error> {
        self.get(self.api(&["subscriptions", "stats"])?).await
    }
}
