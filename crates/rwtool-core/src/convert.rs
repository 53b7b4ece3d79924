// ── API-to-domain type conversions ──
//
// Bridges raw `rwtool_api::types` into `crate::model`. Optional strings
// collapse to empty where the screens treat "missing" and "blank" alike;
// timestamps are parsed leniently and dropped when unparseable.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use rwtool_api::types::{
    DomainBody, DomainResponse, FileRef, ReportFileResponse, ReportMetadataResponse,
    ReviewBody, SubscriptionCreateBody, SubscriptionResponse, SubscriptionStatsResponse,
    UserGroupBody, UserGroupResponse,
};

use crate::model::{
    Domain, DomainDraft, NewRequest, ReportFile, ReportMetadata, ReportRef, ReviewDecision,
    SubscriptionRequest, SubscriptionStats, SubscriptionStatus, UserGroup, UserGroupDraft,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a server timestamp. Accepts `LocalDateTime` output with or
/// without fractional seconds, and RFC 3339 with an offset.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}

fn timestamp(raw: Option<&String>) -> Option<NaiveDateTime> {
    raw.and_then(|s| parse_timestamp(s))
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ── Domains ────────────────────────────────────────────────────────

impl From<DomainResponse> for Domain {
    fn from(d: DomainResponse) -> Self {
        Self {
            created: timestamp(d.created_date.as_ref()),
            id: d.id.into(),
            name: d.name,
            description: d.description.unwrap_or_default(),
        }
    }
}

impl From<&DomainDraft> for DomainBody {
    fn from(d: &DomainDraft) -> Self {
        Self {
            name: d.name.trim().to_owned(),
            description: d.description.trim().to_owned(),
        }
    }
}

// ── Subscriptions ──────────────────────────────────────────────────

impl From<SubscriptionResponse> for SubscriptionRequest {
    fn from(s: SubscriptionResponse) -> Self {
        let status = s
            .status
            .parse()
            .unwrap_or_else(|_| SubscriptionStatus::Other(s.status.clone()));
        Self {
            requested: timestamp(s.requested_date.as_ref()),
            reviewed: timestamp(s.reviewed_date.as_ref()),
            id: s.id.into(),
            user_name: s.user_name.unwrap_or_default(),
            user_email: s.user_email.unwrap_or_default(),
            domain_id: non_blank(s.domain_id).map(Into::into),
            domain_name: s.domain_name.unwrap_or_default(),
            request_reason: s.request_reason.unwrap_or_default(),
            status,
            rejection_reason: non_blank(s.rejection_reason),
            user_department: non_blank(s.user_department),
            user_role: non_blank(s.user_role),
        }
    }
}

impl From<NewRequest> for SubscriptionCreateBody {
    fn from(r: NewRequest) -> Self {
        Self {
            domain_id: r.domain_id.to_string(),
            domain_name: r.domain_name,
            request_reason: r.reason.trim().to_owned(),
            user_name: r.user_name,
            user_email: r.user_email,
            user_department: r.user_department,
            user_role: r.user_role,
        }
    }
}

impl From<ReviewDecision> for ReviewBody {
    fn from(d: ReviewDecision) -> Self {
        match d {
            ReviewDecision::Approve => Self {
                action: "APPROVE".into(),
                rejection_reason: None,
            },
            ReviewDecision::Reject { reason } => Self {
                action: "REJECT".into(),
                rejection_reason: Some(reason),
            },
        }
    }
}

impl From<SubscriptionStatsResponse> for SubscriptionStats {
    fn from(s: SubscriptionStatsResponse) -> Self {
        Self {
            total: s.total_requests,
            pending: s.pending_requests,
            approved: s.approved_requests,
            rejected: s.rejected_requests,
            approval_rate: s.approval_rate,
        }
    }
}

// ── User groups ────────────────────────────────────────────────────

impl From<UserGroupResponse> for UserGroup {
    fn from(g: UserGroupResponse) -> Self {
        Self {
            created: timestamp(g.created_date.as_ref()),
            updated: timestamp(g.updated_date.as_ref()),
            id: g.id.into(),
            ad_group_name: g.ad_group_name,
            associated_domain: non_blank(g.associated_domain),
            folder_access: g.folder_access,
            members: g.members,
        }
    }
}

impl From<&UserGroupDraft> for UserGroupBody {
    fn from(d: &UserGroupDraft) -> Self {
        Self {
            ad_group_name: d.ad_group_name.trim().to_owned(),
            folder_access: d.folder_access.clone(),
            associated_domain: d.associated_domain.trim().to_owned(),
            members: d.members.clone(),
        }
    }
}

// ── Reports ────────────────────────────────────────────────────────

impl From<ReportFileResponse> for ReportFile {
    fn from(f: ReportFileResponse) -> Self {
        let last_modified = f.last_modified.and_then(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });
        Self {
            file_name: f.file_name,
            folder: f.folder.unwrap_or_default(),
            size: f.size,
            last_modified,
            extra: f.extra,
        }
    }
}

impl From<ReportMetadataResponse> for ReportMetadata {
    fn from(m: ReportMetadataResponse) -> Self {
        Self {
            reference: ReportRef::new(m.folder, m.file_name),
            size: m.size,
            content_type: m.content_type,
            exists: m.exists,
        }
    }
}

impl From<FileRef> for ReportRef {
    fn from(f: FileRef) -> Self {
        Self::new(f.folder, f.file_name)
    }
}

impl From<ReportRef> for FileRef {
    fn from(r: ReportRef) -> Self {
        Self {
            folder: r.folder,
            file_name: r.file_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_local_date_time_variants() {
        assert!(parse_timestamp("2024-03-01T10:15:30").is_some());
        assert!(parse_timestamp("2024-03-01T10:15:30.123456").is_some());
        assert!(parse_timestamp("2024-03-01T10:15").is_some());
        assert!(parse_timestamp("2024-03-01T10:15:30Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn subscription_conversion_normalizes_blanks() {
        let wire = SubscriptionResponse {
            id: "42".into(),
            user_name: Some("Ann".into()),
            user_email: Some("ann@corp.com".into()),
            domain_id: Some(String::new()),
            domain_name: Some("Finance".into()),
            request_reason: None,
            status: "pending".into(),
            requested_date: Some("2024-03-01T10:15:30".into()),
            reviewed_date: None,
            rejection_reason: Some("  ".into()),
            user_department: None,
            user_role: Some("USER".into()),
        };
        let r = SubscriptionRequest::from(wire);
        assert_eq!(r.id.as_str(), "42");
        assert_eq!(r.status, SubscriptionStatus::Pending);
        assert_eq!(r.domain_id, None);
        assert_eq!(r.rejection_reason, None);
        assert!(r.requested.is_some());
        assert_eq!(r.user_role.as_deref(), Some("USER"));
    }

    #[test]
    fn review_decision_body() {
        let body = ReviewBody::from(ReviewDecision::Reject {
            reason: "Domain access restricted".into(),
        });
        assert_eq!(body.action, "REJECT");
        assert_eq!(body.rejection_reason.as_deref(), Some("Domain access restricted"));
        assert_eq!(ReviewBody::from(ReviewDecision::Approve).rejection_reason, None);
    }

    #[test]
    fn report_file_keeps_extra_and_formats_time() {
        let wire: ReportFileResponse = serde_json::from_value(serde_json::json!({
            "name": "q1.pdf",
            "folder": "Finance",
            "size": 2048,
            "lastModified": 1_700_000_000,
            "owner": "ops"
        }))
        .unwrap_or_else(|e| panic!("fixture: {e}"));
        let file = ReportFile::from(wire);
        assert_eq!(file.file_name, "q1.pdf");
        assert_eq!(file.last_modified.as_deref(), Some("1700000000"));
        assert_eq!(file.extra.get("owner"), Some(&Value::String("ops".into())));
    }
}
