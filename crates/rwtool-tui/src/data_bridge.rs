//! Data bridge: connects view-model watch channels to TUI actions.
//!
//! Every collection, filter, dialog slot and notifier the screens read
//! from is subscribed here. A change becomes `DataChanged` (screens then
//! re-read the view-model) or `NoticeChanged` for the notification slot.

use futures::StreamExt;
use futures::stream::{BoxStream, select_all};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use rwtool_core::{Notice, Notifier};

use crate::action::Action;
use crate::screen::ScreenId;
use crate::screens::ViewModels;

fn on_change<T>(rx: watch::Receiver<T>, screen: ScreenId) -> BoxStream<'static, Action>
where
    T: Clone + Send + Sync + 'static,
{
    WatchStream::from_changes(rx)
        .map(move |_| Action::DataChanged(screen))
        .boxed()
}

fn on_notice(notifier: &Notifier, screen: ScreenId) -> BoxStream<'static, Action> {
    WatchStream::from_changes(notifier.subscribe())
        .map(move |notice: Option<Notice>| Action::NoticeChanged(screen, notice))
        .boxed()
}

fn watchers(vms: &ViewModels) -> Vec<BoxStream<'static, Action>> {
    use ScreenId::{Approvals, Catalog, Dashboard, Domains, Groups, MySubscriptions, Reports};

    let d = &vms.dashboard;
    let dm = &vms.domains;
    let a = &vms.approvals;
    let g = &vms.groups;
    let c = &vms.catalog;
    let m = &vms.my_subscriptions;
    let r = &vms.reports;

    vec![
        on_change(d.requests().subscribe(), Dashboard),
        on_change(d.domains().subscribe(), Dashboard),
        on_change(d.subscribe_stats(), Dashboard),
        on_notice(d.notifier(), Dashboard),
        on_change(dm.domains().subscribe(), Domains),
        on_change(dm.filter().subscribe(), Domains),
        on_change(dm.editor().subscribe(), Domains),
        on_change(dm.pending_delete().subscribe(), Domains),
        on_notice(dm.notifier(), Domains),
        on_change(a.requests().subscribe(), Approvals),
        on_change(a.filter().subscribe(), Approvals),
        on_change(a.reject_dialog().subscribe(), Approvals),
        on_notice(a.notifier(), Approvals),
        on_change(g.groups().subscribe(), Groups),
        on_change(g.folders().subscribe(), Groups),
        on_change(g.domains().subscribe(), Groups),
        on_change(g.filter().subscribe(), Groups),
        on_change(g.editor().subscribe(), Groups),
        on_change(g.pending_delete().subscribe(), Groups),
        on_notice(g.notifier(), Groups),
        on_change(c.entries().subscribe(), Catalog),
        on_change(c.filter().subscribe(), Catalog),
        on_change(c.dialog().subscribe(), Catalog),
        on_notice(c.notifier(), Catalog),
        on_change(m.requests().subscribe(), MySubscriptions),
        on_change(m.filter().subscribe(), MySubscriptions),
        on_notice(m.notifier(), MySubscriptions),
        on_change(r.files().subscribe(), Reports),
        on_change(r.favorites().subscribe(), Reports),
        on_change(r.filter().subscribe(), Reports),
        on_change(r.opened().subscribe(), Reports),
        on_change(r.subscribe_selection(), Reports),
        on_notice(r.notifier(), Reports),
    ]
}

/// Subscribe to every view-model channel, then forward changes as
/// actions until cancelled or the app loop goes away.
///
/// Subscriptions are taken before this returns, so a change made right
/// after the call is never missed.
pub fn spawn_data_bridge(
    vms: &ViewModels,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut changes = select_all(watchers(vms));
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                next = changes.next() => {
                    let Some(action) = next else { break };
                    if action_tx.send(action).is_err() {
                        break;
                    }
                }
            }
        }
        debug!("data bridge shut down");
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rwtool_core::NoticeTimings;

    use super::*;
    use crate::screens::fixtures::{gateways, session};

    fn view_models() -> ViewModels {
        ViewModels::new(&gateways(), &session(), NoticeTimings::default())
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Action>) -> Action {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("action within timeout")
            .expect("bridge alive")
    }

    #[tokio::test]
    async fn filter_change_marks_screen_dirty() {
        let vms = view_models();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = spawn_data_bridge(&vms, tx, cancel.clone());

        vms.catalog.filter().set_search("fin");
        assert_eq!(next(&mut rx).await, Action::DataChanged(ScreenId::Catalog));

        cancel.cancel();
        handle.await.expect("bridge joins");
    }

    #[tokio::test]
    async fn notices_carry_their_screen() {
        let vms = view_models();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let _handle = spawn_data_bridge(&vms, tx, cancel.clone());

        vms.domains.notifier().validation("Name is required");
        match next(&mut rx).await {
            Action::NoticeChanged(ScreenId::Domains, Some(notice)) => {
                assert_eq!(notice.message, "Name is required");
            }
            other => panic!("unexpected action {other:?}"),
        }
        cancel.cancel();
    }

    #[tokio::test]
    async fn stops_when_cancelled() {
        let vms = view_models();
        let (tx, _rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = spawn_data_bridge(&vms, tx, cancel.clone());
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("bridge stops")
            .expect("bridge joins");
    }
}
