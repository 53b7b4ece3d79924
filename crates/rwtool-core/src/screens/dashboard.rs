// ── Admin dashboard ──

use std::cmp::Reverse;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;
use crate::gateway::{Gateways, SubscriptionGateway};
use crate::model::{Domain, SubscriptionRequest, SubscriptionStats};
use crate::notify::Notifier;
use crate::sync::SyncController;

const LOAD_FAILED: &str = "Error loading dashboard data";

/// How many recent requests and domains the dashboard lists.
pub const RECENT_LIMIT: usize = 3;

pub struct Dashboard {
    notifier: Notifier,
    requests: SyncController<SubscriptionRequest>,
    domains: SyncController<Domain>,
    gateway: Arc<dyn SubscriptionGateway>,
    stats: watch::Sender<SubscriptionStats>,
}

impl Dashboard {
    pub fn new(gateways: &Gateways, notifier: Notifier) -> Self {
        let gateway = Arc::clone(&gateways.subscriptions);
        let loader = Arc::clone(&gateway);
        let requests = SyncController::new("requests", LOAD_FAILED, notifier.clone(), move || {
            let gw = Arc::clone(&loader);
            async move { gw.list_requests().await }
        });
        let loader = Arc::clone(&gateways.domains);
        let domains = SyncController::new("domains", LOAD_FAILED, notifier.clone(), move || {
            let gw = Arc::clone(&loader);
            async move { gw.list_domains().await }
        });
        Self {
            notifier,
            requests,
            domains,
            gateway,
            stats: watch::channel(SubscriptionStats::default()).0,
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn requests(&self) -> &SyncController<SubscriptionRequest> {
        &self.requests
    }

    pub fn domains(&self) -> &SyncController<Domain> {
        &self.domains
    }

    /// Load requests and domains, then the stats.
    ///
    /// Stats come from the server; when that call fails they are
    /// computed from the request list just loaded.
    pub async fn load(&self) -> Result<(), CoreError> {
        let (requests, domains) = tokio::join!(self.requests.refresh(), self.domains.refresh());

        let stats = match self.gateway.stats().await {
            Ok(stats) => stats,
            Err(err) => {
                debug!(error = %err, "stats endpoint failed, computing locally");
                let items = self.requests.items();
                SubscriptionStats::from_requests(items.iter().map(|r| &**r))
            }
        };
        if !self.requests.is_discarded() {
            self.stats.send_replace(stats);
        }
        requests.and(domains)
    }

    pub fn stats(&self) -> SubscriptionStats {
        self.stats.borrow().clone()
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<SubscriptionStats> {
        self.stats.subscribe()
    }

    /// Newest requests first. Undated requests sort last.
    pub fn recent_requests(&self) -> Vec<Arc<SubscriptionRequest>> {
        let mut items: Vec<_> = self.requests.items().iter().cloned().collect();
        items.sort_by_key(|r| Reverse(r.requested));
        items.truncate(RECENT_LIMIT);
        items
    }

    /// Newest domains first. Undated domains sort last.
    pub fn recent_domains(&self) -> Vec<Arc<Domain>> {
        let mut items: Vec<_> = self.domains.items().iter().cloned().collect();
        items.sort_by_key(|d| Reverse(d.created));
        items.truncate(RECENT_LIMIT);
        items
    }

    pub fn pending_count(&self) -> usize {
        self.requests.items().iter().filter(|r| r.is_pending()).count()
    }

    pub fn discard(&self) {
        self.requests.discard();
        self.domains.discard();
        self.notifier.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gateway::{
        MockAuthGateway, MockDomainGateway, MockFolderGateway, MockReportGateway,
        MockSubscriptionGateway, MockUserGroupGateway,
    };
    use crate::model::SubscriptionStatus;
    use crate::screens::fixtures::{domain, request};

    fn at(day: u32) -> Option<chrono::NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 3, day).and_then(|d| d.and_hms_opt(9, 0, 0))
    }

    fn gateways(subs: MockSubscriptionGateway) -> Gateways {
        let mut domains = MockDomainGateway::new();
        domains.expect_list_domains().returning(|| {
            let mut out = Vec::new();
            for (i, day) in [(1, None), (2, at(5)), (3, at(9)), (4, at(2)), (5, at(7))] {
                let mut d = domain(&i.to_string(), &format!("D{i}"));
                d.created = day;
                out.push(d);
            }
            Ok(out)
        });
        Gateways {
            domains: Arc::new(domains),
            subscriptions: Arc::new(subs),
            groups: Arc::new(MockUserGroupGateway::new()),
            folders: Arc::new(MockFolderGateway::new()),
            reports: Arc::new(MockReportGateway::new()),
            auth: Arc::new(MockAuthGateway::new()),
        }
    }

    fn requests() -> Vec<SubscriptionRequest> {
        let mut out = Vec::new();
        for (id, status, day) in [
            ("a", SubscriptionStatus::Approved, at(1)),
            ("b", SubscriptionStatus::Pending, at(4)),
            ("c", SubscriptionStatus::Rejected, at(3)),
            ("d", SubscriptionStatus::Rejected, at(8)),
        ] {
            let mut r = request(id, "Finance", status);
            r.requested = day;
            out.push(r);
        }
        out
    }

    #[tokio::test]
    async fn recent_lists_are_newest_first() {
        let mut subs = MockSubscriptionGateway::new();
        subs.expect_list_requests().returning(|| Ok(requests()));
        subs.expect_stats().returning(|| {
            Ok(SubscriptionStats {
                total: 10,
                pending: 2,
                approved: 6,
                rejected: 2,
                approval_rate: 75.0,
            })
        });

        let dash = Dashboard::new(&gateways(subs), Notifier::default());
        dash.load().await.expect("load");

        let ids: Vec<_> = dash.recent_requests().iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["d", "b", "c"]);
        let names: Vec<_> = dash.recent_domains().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["D3", "D5", "D2"]);
        assert_eq!(dash.stats().total, 10);
        assert_eq!(dash.pending_count(), 1);
    }

    #[tokio::test]
    async fn stats_fall_back_to_local_counts() {
        let mut subs = MockSubscriptionGateway::new();
        subs.expect_list_requests().returning(|| Ok(requests()));
        subs.expect_stats().returning(|| {
            Err(CoreError::NotFound { message: None })
        });

        let dash = Dashboard::new(&gateways(subs), Notifier::default());
        dash.load().await.expect("load");

        let stats = dash.stats();
        assert_eq!((stats.total, stats.pending, stats.approved, stats.rejected), (4, 1, 1, 2));
        assert!((stats.approval_rate - 33.3).abs() < f64::EPSILON);
    }
}
