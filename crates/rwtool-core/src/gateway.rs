// ── Remote resource gateways ──
//
// One trait per entity family. Screens and controllers depend on the
// traits (`Arc<dyn ...>`), never on `ApiClient` directly; `HttpGateway`
// is the production implementation. Each call is a single request with
// no retry; failures come back as `CoreError` carrying the server's
// message when it sent one.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::SecretString;
use url::Url;

#[cfg(test)]
use mockall::automock;

use rwtool_api::ApiClient;
use rwtool_api::types::{
    DomainBody, FavoriteBody, FileRef, PresignBody, ReviewBody, SignupBody,
    SubscriptionCreateBody, UserGroupBody,
};

use crate::error::CoreError;
use crate::model::{
    Domain, DomainDraft, DomainId, Folder, GroupId, NewRequest, ReportFile, ReportMetadata,
    ReportRef, RequestId, ReviewDecision, SubscriptionRequest, SubscriptionStats, UserGroup,
    UserGroupDraft,
};

// ── Traits ───────────────────────────────────────────────────────────

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DomainGateway: Send + Sync {
    async fn list_domains(&self) -> Result<Vec<Domain>, CoreError>;
    async fn get_domain(&self, id: DomainId) -> Result<Domain, CoreError>;
    async fn create_domain(&self, draft: DomainDraft) -> Result<Domain, CoreError>;
    async fn update_domain(&self, id: DomainId, draft: DomainDraft) -> Result<Domain, CoreError>;
    async fn delete_domain(&self, id: DomainId) -> Result<(), CoreError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubscriptionGateway: Send + Sync {
    async fn list_requests(&self) -> Result<Vec<SubscriptionRequest>, CoreError>;
    async fn list_pending(&self) -> Result<Vec<SubscriptionRequest>, CoreError>;
    /// Requests filed by one user.
    async fn list_for_user(&self, email: String) -> Result<Vec<SubscriptionRequest>, CoreError>;
    async fn get_request(&self, id: RequestId) -> Result<SubscriptionRequest, CoreError>;
    async fn create_request(&self, request: NewRequest) -> Result<SubscriptionRequest, CoreError>;
    async fn approve(&self, id: RequestId) -> Result<SubscriptionRequest, CoreError>;
    async fn reject(&self, id: RequestId, reason: String) -> Result<SubscriptionRequest, CoreError>;
    async fn review(
        &self,
        id: RequestId,
        decision: ReviewDecision,
    ) -> Result<SubscriptionRequest, CoreError>;
    /// Withdraw a request. Only the requester may cancel.
    async fn cancel(&self, id: RequestId, requester_email: String) -> Result<(), CoreError>;
    async fn stats(&self) -> Result<SubscriptionStats, CoreError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserGroupGateway: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<UserGroup>, CoreError>;
    async fn get_group(&self, id: GroupId) -> Result<UserGroup, CoreError>;
    async fn groups_for_user(&self, email: String) -> Result<Vec<UserGroup>, CoreError>;
    async fn folders_for_user(&self, email: String) -> Result<Vec<Folder>, CoreError>;
    async fn create_group(&self, draft: UserGroupDraft) -> Result<UserGroup, CoreError>;
    async fn update_group(&self, id: GroupId, draft: UserGroupDraft) -> Result<UserGroup, CoreError>;
    async fn delete_group(&self, id: GroupId) -> Result<(), CoreError>;
    async fn add_member(&self, id: GroupId, email: String) -> Result<UserGroup, CoreError>;
    async fn remove_member(&self, id: GroupId, email: String) -> Result<UserGroup, CoreError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait FolderGateway: Send + Sync {
    async fn list_folders(&self) -> Result<Vec<Folder>, CoreError>;
    async fn folder_files(&self, folder: String) -> Result<Vec<ReportFile>, CoreError>;
    async fn user_files(&self, email: String) -> Result<Vec<ReportFile>, CoreError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReportGateway: Send + Sync {
    fn preview_url(&self, report: &ReportRef) -> Result<Url, CoreError>;
    fn download_url(&self, report: &ReportRef) -> Result<Url, CoreError>;
    async fn metadata(&self, report: ReportRef) -> Result<ReportMetadata, CoreError>;
    async fn preview(&self, report: ReportRef) -> Result<Bytes, CoreError>;
    async fn download(&self, report: ReportRef) -> Result<Bytes, CoreError>;
    async fn download_batch(&self, reports: Vec<ReportRef>, zip_name: String) -> Result<Bytes, CoreError>;
    /// Short-lived direct link for viewing a report.
    async fn presign(
        &self,
        report_id: String,
        user_id: String,
        report: ReportRef,
    ) -> Result<String, CoreError>;
    async fn favorites(&self, user_id: String) -> Result<Vec<ReportRef>, CoreError>;
    async fn add_favorite(&self, user_id: String, report: ReportRef) -> Result<(), CoreError>;
    async fn remove_favorite(&self, user_id: String, report: ReportRef) -> Result<(), CoreError>;
}

/// Account creation fields sent to the signup endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    /// Digits only.
    pub phone_number: String,
    /// Only sent for subscriber accounts.
    pub domain: Option<String>,
    pub password: String,
    pub role: crate::session::Role,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a session token.
    async fn login(&self, email: String, password: SecretString) -> Result<SecretString, CoreError>;
    async fn signup(&self, account: NewAccount) -> Result<(), CoreError>;
}

// ── Bundle ───────────────────────────────────────────────────────────

/// Every gateway a console needs, behind trait objects.
#[derive(Clone)]
pub struct Gateways {
    pub domains: Arc<dyn DomainGateway>,
    pub subscriptions: Arc<dyn SubscriptionGateway>,
    pub groups: Arc<dyn UserGroupGateway>,
    pub folders: Arc<dyn FolderGateway>,
    pub reports: Arc<dyn ReportGateway>,
    pub auth: Arc<dyn AuthGateway>,
}

impl Gateways {
    /// All gateways backed by one HTTP client.
    pub fn http(client: ApiClient) -> Self {
        let gw = Arc::new(HttpGateway::new(client));
        Self {
            domains: gw.clone(),
            subscriptions: gw.clone(),
            groups: gw.clone(),
            folders: gw.clone(),
            reports: gw.clone(),
            auth: gw,
        }
    }
}

impl std::fmt::Debug for Gateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateways").finish_non_exhaustive()
    }
}

// ── HTTP implementation ──────────────────────────────────────────────

/// Gateway implementation over the REST client.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: ApiClient,
}

impl HttpGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

fn convert_all<W, T: From<W>>(items: Vec<W>) -> Vec<T> {
    items.into_iter().map(T::from).collect()
}

#[async_trait]
impl DomainGateway for HttpGateway {
    async fn list_domains(&self) -> Result<Vec<Domain>, CoreError> {
        Ok(convert_all(self.client.list_domains().await?))
    }

    async fn get_domain(&self, id: DomainId) -> Result<Domain, CoreError> {
        Ok(self.client.get_domain(id.as_str()).await?.into())
    }

    async fn create_domain(&self, draft: DomainDraft) -> Result<Domain, CoreError> {
        Ok(self.client.create_domain(&DomainBody::from(&draft)).await?.into())
    }

    async fn update_domain(&self, id: DomainId, draft: DomainDraft) -> Result<Domain, CoreError> {
        let body = DomainBody::from(&draft);
        Ok(self.client.update_domain(id.as_str(), &body).await?.into())
    }

    async fn delete_domain(&self, id: DomainId) -> Result<(), CoreError> {
        Ok(self.client.delete_domain(id.as_str()).await?)
    }
}

#[async_trait]
impl SubscriptionGateway for HttpGateway {
    async fn list_requests(&self) -> Result<Vec<SubscriptionRequest>, CoreError> {
        Ok(convert_all(self.client.list_subscriptions().await?))
    }

    async fn list_pending(&self) -> Result<Vec<SubscriptionRequest>, CoreError> {
        Ok(convert_all(self.client.list_pending_subscriptions().await?))
    }

    async fn list_for_user(&self, email: String) -> Result<Vec<SubscriptionRequest>, CoreError> {
        Ok(convert_all(self.client.list_user_subscriptions(&email).await?))
    }

    async fn get_request(&self, id: RequestId) -> Result<SubscriptionRequest, CoreError> {
        Ok(self.client.get_subscription(id.as_str()).await?.into())
    }

    async fn create_request(&self, request: NewRequest) -> Result<SubscriptionRequest, CoreError> {
        let body = SubscriptionCreateBody::from(request);
        Ok(self.client.create_subscription(&body).await?.into())
    }

    async fn approve(&self, id: RequestId) -> Result<SubscriptionRequest, CoreError> {
        Ok(self.client.approve_subscription(id.as_str()).await?.into())
    }

    async fn reject(&self, id: RequestId, reason: String) -> Result<SubscriptionRequest, CoreError> {
        Ok(self.client.reject_subscription(id.as_str(), &reason).await?.into())
    }

    async fn review(
        &self,
        id: RequestId,
        decision: ReviewDecision,
    ) -> Result<SubscriptionRequest, CoreError> {
        let body = ReviewBody::from(decision);
        Ok(self.client.review_subscription(id.as_str(), &body).await?.into())
    }

    async fn cancel(&self, id: RequestId, requester_email: String) -> Result<(), CoreError> {
        Ok(self
            .client
            .cancel_subscription(id.as_str(), &requester_email)
            .await?)
    }

    async fn stats(&self) -> Result<SubscriptionStats, CoreError> {
        Ok(self.client.subscription_stats().await?.into())
    }
}

#[async_trait]
impl UserGroupGateway for HttpGateway {
    async fn list_groups(&self) -> Result<Vec<UserGroup>, CoreError> {
        Ok(convert_all(self.client.list_user_groups().await?))
    }

    async fn get_group(&self, id: GroupId) -> Result<UserGroup, CoreError> {
        Ok(self.client.get_user_group(id.0).await?.into())
    }

    async fn groups_for_user(&self, email: String) -> Result<Vec<UserGroup>, CoreError> {
        Ok(convert_all(self.client.list_groups_for_user(&email).await?))
    }

    async fn folders_for_user(&self, email: String) -> Result<Vec<Folder>, CoreError> {
        let names = self.client.list_folders_for_user(&email).await?;
        Ok(names.into_iter().map(Folder).collect())
    }

    async fn create_group(&self, draft: UserGroupDraft) -> Result<UserGroup, CoreError> {
        Ok(self.client.create_user_group(&UserGroupBody::from(&draft)).await?.into())
    }

    async fn update_group(&self, id: GroupId, draft: UserGroupDraft) -> Result<UserGroup, CoreError> {
        let body = UserGroupBody::from(&draft);
        Ok(self.client.update_user_group(id.0, &body).await?.into())
    }

    async fn delete_group(&self, id: GroupId) -> Result<(), CoreError> {
        Ok(self.client.delete_user_group(id.0).await?)
    }

    async fn add_member(&self, id: GroupId, email: String) -> Result<UserGroup, CoreError> {
        Ok(self.client.add_group_member(id.0, &email).await?.into())
    }

    async fn remove_member(&self, id: GroupId, email: String) -> Result<UserGroup, CoreError> {
        Ok(self.client.remove_group_member(id.0, &email).await?.into())
    }
}

#[async_trait]
impl FolderGateway for HttpGateway {
    async fn list_folders(&self) -> Result<Vec<Folder>, CoreError> {
        let names = self.client.list_folders().await?;
        Ok(names.into_iter().map(Folder).collect())
    }

    async fn folder_files(&self, folder: String) -> Result<Vec<ReportFile>, CoreError> {
        Ok(convert_all(self.client.list_folder_files(&folder).await?))
    }

    async fn user_files(&self, email: String) -> Result<Vec<ReportFile>, CoreError> {
        Ok(convert_all(self.client.list_user_files(&email).await?))
    }
}

#[async_trait]
impl ReportGateway for HttpGateway {
    fn preview_url(&self, report: &ReportRef) -> Result<Url, CoreError> {
        Ok(self.client.preview_url(&report.folder, &report.file_name)?)
    }

    fn download_url(&self, report: &ReportRef) -> Result<Url, CoreError> {
        Ok(self.client.download_url(&report.folder, &report.file_name)?)
    }

    async fn metadata(&self, report: ReportRef) -> Result<ReportMetadata, CoreError> {
        Ok(self
            .client
            .report_metadata(&report.folder, &report.file_name)
            .await?
            .into())
    }

    async fn preview(&self, report: ReportRef) -> Result<Bytes, CoreError> {
        Ok(self.client.preview_report(&report.folder, &report.file_name).await?)
    }

    async fn download(&self, report: ReportRef) -> Result<Bytes, CoreError> {
        Ok(self.client.download_report(&report.folder, &report.file_name).await?)
    }

    async fn download_batch(&self, reports: Vec<ReportRef>, zip_name: String) -> Result<Bytes, CoreError> {
        let files: Vec<FileRef> = reports.into_iter().map(FileRef::from).collect();
        Ok(self.client.download_batch(files, &zip_name).await?)
    }

    async fn presign(
        &self,
        report_id: String,
        user_id: String,
        report: ReportRef,
    ) -> Result<String, CoreError> {
        let body = PresignBody {
            user_id,
            folder: report.folder,
            file_name: report.file_name,
        };
        Ok(self.client.presign_report(&report_id, &body).await?.url)
    }

    async fn favorites(&self, user_id: String) -> Result<Vec<ReportRef>, CoreError> {
        Ok(convert_all(self.client.list_favorites(&user_id).await?))
    }

    async fn add_favorite(&self, user_id: String, report: ReportRef) -> Result<(), CoreError> {
        let body = FavoriteBody {
            user_id,
            folder: report.folder,
            file_name: report.file_name,
        };
        Ok(self.client.add_favorite(&body).await?)
    }

    async fn remove_favorite(&self, user_id: String, report: ReportRef) -> Result<(), CoreError> {
        let body = FavoriteBody {
            user_id,
            folder: report.folder,
            file_name: report.file_name,
        };
        Ok(self.client.remove_favorite(&body).await?)
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn login(&self, email: String, password: SecretString) -> Result<SecretString, CoreError> {
        Ok(self.client.login(&email, &password).await?)
    }

    async fn signup(&self, account: NewAccount) -> Result<(), CoreError> {
        let body = SignupBody {
            full_name: account.full_name,
            email: account.email,
            phone_number: account.phone_number,
            domain: account.domain,
            password: account.password,
            role: account.role.to_string(),
        };
        Ok(self.client.signup(&body).await?)
    }
}
