// ── Approval queue ──
//
// Every subscription request, with approve for pending ones and a
// reject dialog that pre-selects the department-mismatch reason.

use std::sync::Arc;

use strum::EnumIter;

use super::{FilterState, Slot};
use crate::error::CoreError;
use crate::gateway::{Gateways, SubscriptionGateway};
use crate::model::{RequestId, SubscriptionRequest};
use crate::notify::Notifier;
use crate::projection::project;
use crate::sync::SyncController;
use crate::validation;

const LOAD_FAILED: &str = "Error loading subscription requests";
const APPROVED: &str = "Subscription request approved successfully!";
const APPROVE_FAILED: &str = "Error approving request";
const REJECTED: &str = "Subscription request rejected";
const REJECT_FAILED: &str = "Error rejecting request";
const NOT_PENDING: &str = "Only pending requests can be reviewed";

/// Status filter choices offered by the queue.
pub const STATUS_CHOICES: [&str; 3] = ["PENDING", "APPROVED", "REJECTED"];

/// Preset rejection reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum RejectionChoice {
    DepartmentMismatch,
    NotInDirectory,
    InsufficientPermissions,
    AccessRestricted,
    /// Free text entered in the dialog.
    Other,
}

impl RejectionChoice {
    pub fn text(self) -> &'static str {
        match self {
            Self::DepartmentMismatch => "Requested domain does not match user's department",
            Self::NotInDirectory => "User not found in Active Directory",
            Self::InsufficientPermissions => "Insufficient permissions for requested domain",
            Self::AccessRestricted => "Domain access restricted",
            Self::Other => "Other",
        }
    }
}

/// State of the open reject dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectDialog {
    pub request: Arc<SubscriptionRequest>,
    pub choice: Option<RejectionChoice>,
    pub other_text: String,
}

impl RejectDialog {
    /// The reason that would be sent right now.
    pub fn reason(&self) -> String {
        match self.choice {
            Some(RejectionChoice::Other) => self.other_text.trim().to_owned(),
            Some(choice) => choice.text().to_owned(),
            None => String::new(),
        }
    }
}

/// One row of the queue as rendered.
#[derive(Debug, Clone)]
pub struct ApprovalRow {
    pub request: Arc<SubscriptionRequest>,
    pub department_match: bool,
    /// Approve and reject are only offered for pending requests.
    pub can_review: bool,
}

pub struct ApprovalQueue {
    notifier: Notifier,
    requests: SyncController<SubscriptionRequest>,
    gateway: Arc<dyn SubscriptionGateway>,
    filter: FilterState,
    reject: Slot<RejectDialog>,
}

impl ApprovalQueue {
    pub fn new(gateways: &Gateways, notifier: Notifier) -> Self {
        let gateway = Arc::clone(&gateways.subscriptions);
        let loader = Arc::clone(&gateway);
        let requests = SyncController::new("requests", LOAD_FAILED, notifier.clone(), move || {
            let gw = Arc::clone(&loader);
            async move { gw.list_requests().await }
        });
        Self {
            notifier,
            requests,
            gateway,
            filter: FilterState::default(),
            reject: Slot::default(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn requests(&self) -> &SyncController<SubscriptionRequest> {
        &self.requests
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn reject_dialog(&self) -> &Slot<RejectDialog> {
        &self.reject
    }

    pub async fn load(&self) -> Result<(), CoreError> {
        self.requests.refresh().await
    }

    /// Rows matching the current search and status filter.
    pub fn rows(&self) -> Vec<ApprovalRow> {
        let filter = self.filter.get();
        project(&self.requests.items(), &filter.search, &filter.status)
            .into_iter()
            .map(|request| ApprovalRow {
                department_match: request.department_matches(),
                can_review: request.is_pending(),
                request,
            })
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.requests.items().iter().filter(|r| r.is_pending()).count()
    }

    fn pending(&self, id: &RequestId) -> Result<Arc<SubscriptionRequest>, CoreError> {
        let found = self.requests.items().iter().find(|r| &r.id == id).cloned();
        match found {
            Some(request) if request.is_pending() => Ok(request),
            Some(_) => {
                self.notifier.validation(NOT_PENDING);
                Err(CoreError::validation(NOT_PENDING))
            }
            None => {
                let message = format!("Request {id} not found");
                self.notifier.error(message.clone());
                Err(CoreError::NotFound {
                    message: Some(message),
                })
            }
        }
    }

    /// Approve a pending request and re-fetch the queue.
    pub async fn approve(&self, id: &RequestId) -> Result<SubscriptionRequest, CoreError> {
        let request = self.pending(id)?;
        self.requests
            .mutate(self.gateway.approve(request.id.clone()), APPROVED, APPROVE_FAILED)
            .await
    }

    // ── Reject dialog ────────────────────────────────────────────────

    /// Open the reject dialog, pre-selecting the mismatch reason when the
    /// requester's department differs from the requested domain.
    pub fn open_reject(&self, id: &RequestId) -> Result<(), CoreError> {
        let request = self.pending(id)?;
        let choice = (!request.department_matches()).then_some(RejectionChoice::DepartmentMismatch);
        self.reject.open(RejectDialog {
            request,
            choice,
            other_text: String::new(),
        });
        Ok(())
    }

    pub fn choose_reason(&self, choice: RejectionChoice) {
        self.reject.update(|d| d.choice = Some(choice));
    }

    pub fn set_other_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.reject.update(|d| d.other_text = text);
    }

    pub fn close_reject(&self) {
        self.reject.close();
    }

    /// Send the rejection, re-fetch, then close the dialog.
    ///
    /// An empty reason is rejected locally. On server failure the dialog
    /// stays open.
    pub async fn confirm_reject(&self) -> Result<SubscriptionRequest, CoreError> {
        let Some(dialog) = self.reject.get() else {
            return Err(CoreError::validation("No request selected"));
        };
        let reason = dialog.reason();
        if let Err(err) = validation::rejection_reason(&reason) {
            self.notifier.validation(err.user_message(""));
            return Err(err);
        }

        let updated = self
            .requests
            .mutate(
                self.gateway.reject(dialog.request.id.clone(), reason),
                REJECTED,
                REJECT_FAILED,
            )
            .await?;
        self.reject.close();
        Ok(updated)
    }

    pub fn discard(&self) {
        self.requests.discard();
        self.notifier.dismiss();
    }
}
