// ── Subscription requests ──
//
// A user's request for access to a domain, and the review decision an
// administrator makes on it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ids::{DomainId, RequestId};

/// Review state of a subscription request.
///
/// Unknown server values are kept verbatim in `Other` rather than
/// failing the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SubscriptionStatus {
    Pending,
    Approved,
    Rejected,
    #[strum(default)]
    Other(String),
}

impl SubscriptionStatus {
    /// Upper-case wire form (`PENDING`, `APPROVED`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Other(raw) => raw,
        }
    }

    /// Lower-case form used by the subscriber catalog filter.
    pub fn lower(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

/// A subscription request as seen by administrators and its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub id: RequestId,
    pub user_name: String,
    pub user_email: String,
    pub domain_id: Option<DomainId>,
    pub domain_name: String,
    pub request_reason: String,
    pub status: SubscriptionStatus,
    pub requested: Option<NaiveDateTime>,
    pub reviewed: Option<NaiveDateTime>,
    pub rejection_reason: Option<String>,
    pub user_department: Option<String>,
    pub user_role: Option<String>,
}

/// Department shown when the requester's department is unknown.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

impl SubscriptionRequest {
    pub fn is_pending(&self) -> bool {
        self.status == SubscriptionStatus::Pending
    }

    /// Requester's department, or `"Unknown"`.
    pub fn department(&self) -> &str {
        self.user_department
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(UNKNOWN_DEPARTMENT)
    }

    /// Whether the requester's department names the requested domain
    /// (case-insensitive). Rejections for a mismatch are pre-filled.
    pub fn department_matches(&self) -> bool {
        self.department().eq_ignore_ascii_case(&self.domain_name)
    }
}

/// What a subscriber submits when requesting a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    pub domain_id: DomainId,
    pub domain_name: String,
    pub reason: String,
    pub user_name: String,
    pub user_email: String,
    pub user_department: Option<String>,
    pub user_role: Option<String>,
}

/// Decision for the combined review endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject { reason: String },
}

// ── Stats ────────────────────────────────────────────────────────────

/// Aggregate request counts shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    /// Approved over reviewed (approved + rejected), as a percentage
    /// rounded to one decimal; 0 when nothing has been reviewed.
    pub approval_rate: f64,
}

impl SubscriptionStats {
    /// Compute the stats locally from a request list.
    pub fn from_requests<'a>(requests: impl IntoIterator<Item = &'a SubscriptionRequest>) -> Self {
        let mut stats = Self::default();
        for r in requests {
            stats.total += 1;
            match r.status {
                SubscriptionStatus::Pending => stats.pending += 1,
                SubscriptionStatus::Approved => stats.approved += 1,
                SubscriptionStatus::Rejected => stats.rejected += 1,
                SubscriptionStatus::Other(_) => {}
            }
        }
        stats.approval_rate = approval_rate(stats.approved, stats.approved + stats.rejected);
        stats
    }
}

#[allow(clippy::cast_precision_loss)]
fn approval_rate(approved: u64, reviewed: u64) -> f64 {
    if reviewed == 0 {
        return 0.0;
    }
    (approved as f64 * 1000.0 / reviewed as f64).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: SubscriptionStatus, department: Option<&str>, domain: &str) -> SubscriptionRequest {
        SubscriptionRequest {
            id: "r".into(),
            user_name: "Ann".into(),
            user_email: "ann@corp.com".into(),
            domain_id: None,
            domain_name: domain.into(),
            request_reason: String::new(),
            status,
            requested: None,
            reviewed: None,
            rejection_reason: None,
            user_department: department.map(str::to_owned),
            user_role: None,
        }
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("pending".parse::<SubscriptionStatus>().ok(), Some(SubscriptionStatus::Pending));
        assert_eq!("APPROVED".parse::<SubscriptionStatus>().ok(), Some(SubscriptionStatus::Approved));
        assert_eq!(
            "ARCHIVED".parse::<SubscriptionStatus>().ok(),
            Some(SubscriptionStatus::Other("ARCHIVED".into()))
        );
        assert_eq!(SubscriptionStatus::Rejected.to_string(), "REJECTED");
    }

    #[test]
    fn department_match_is_case_insensitive() {
        assert!(request(SubscriptionStatus::Pending, Some("finance"), "Finance").department_matches());
        assert!(!request(SubscriptionStatus::Pending, Some("HR"), "Finance").department_matches());
        let unknown = request(SubscriptionStatus::Pending, None, "Finance");
        assert_eq!(unknown.department(), "Unknown");
        assert!(!unknown.department_matches());
    }

    #[test]
    fn stats_rate_rounds_to_one_decimal() {
        let list = [
            request(SubscriptionStatus::Approved, None, "A"),
            request(SubscriptionStatus::Pending, None, "A"),
            request(SubscriptionStatus::Rejected, None, "A"),
            request(SubscriptionStatus::Rejected, None, "A"),
        ];
        let stats = SubscriptionStats::from_requests(&list);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending, 1);
        assert!((stats.approval_rate - 33.3).abs() < 1e-9);
        assert!(SubscriptionStats::from_requests(std::iter::empty()).approval_rate.abs() < f64::EPSILON);
    }
}
