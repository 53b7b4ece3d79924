//! Screen components. Each wraps one core view-model and only renders
//! its state or calls its operations.

pub mod approvals;
pub mod catalog;
pub mod dashboard;
pub mod domains;
pub mod groups;
pub mod my_subscriptions;
pub mod reports;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, TableState};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tracing::debug;

use rwtool_core::screens::{
    ApprovalQueue, Catalog, Dashboard, DomainManagement, MySubscriptions, ReportViewer,
    UserGroupAccess,
};
use rwtool_core::{CoreError, Gateways, NoticeTimings, Notifier, Session};

use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;

/// One view-model per screen, each with its own notification slot.
#[derive(Clone)]
pub struct ViewModels {
    pub dashboard: Arc<Dashboard>,
    pub domains: Arc<DomainManagement>,
    pub approvals: Arc<ApprovalQueue>,
    pub groups: Arc<UserGroupAccess>,
    pub catalog: Arc<Catalog>,
    pub my_subscriptions: Arc<MySubscriptions>,
    pub reports: Arc<ReportViewer>,
}

impl ViewModels {
    pub fn new(gateways: &Gateways, session: &Session, timings: NoticeTimings) -> Self {
        let notifier = || Notifier::new(timings);
        Self {
            dashboard: Arc::new(Dashboard::new(gateways, notifier())),
            domains: Arc::new(DomainManagement::new(gateways, notifier())),
            approvals: Arc::new(ApprovalQueue::new(gateways, notifier())),
            groups: Arc::new(UserGroupAccess::new(gateways, notifier())),
            catalog: Arc::new(Catalog::new(gateways, notifier(), session.clone())),
            my_subscriptions: Arc::new(MySubscriptions::new(gateways, notifier(), session.clone())),
            reports: Arc::new(ReportViewer::new(gateways, notifier(), session.clone())),
        }
    }

    /// The notification slot behind a screen.
    pub fn notifier(&self, screen: ScreenId) -> &Notifier {
        match screen {
            ScreenId::Dashboard => self.dashboard.notifier(),
            ScreenId::Domains => self.domains.notifier(),
            ScreenId::Approvals => self.approvals.notifier(),
            ScreenId::Groups => self.groups.notifier(),
            ScreenId::Catalog => self.catalog.notifier(),
            ScreenId::MySubscriptions => self.my_subscriptions.notifier(),
            ScreenId::Reports => self.reports.notifier(),
        }
    }

    /// Drop every late response and pending notice timer.
    pub fn discard(&self) {
        self.dashboard.discard();
        self.domains.discard();
        self.approvals.discard();
        self.groups.discard();
        self.catalog.discard();
        self.my_subscriptions.discard();
        self.reports.discard();
    }
}

/// Build the components for every tab.
pub fn create_screens(
    vms: &ViewModels,
    download_dir: PathBuf,
) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Dashboard,
            Box::new(dashboard::DashboardScreen::new(Arc::clone(&vms.dashboard))),
        ),
        (
            ScreenId::Domains,
            Box::new(domains::DomainsScreen::new(Arc::clone(&vms.domains))),
        ),
        (
            ScreenId::Approvals,
            Box::new(approvals::ApprovalsScreen::new(Arc::clone(&vms.approvals))),
        ),
        (
            ScreenId::Groups,
            Box::new(groups::GroupsScreen::new(Arc::clone(&vms.groups))),
        ),
        (
            ScreenId::Catalog,
            Box::new(catalog::CatalogScreen::new(Arc::clone(&vms.catalog))),
        ),
        (
            ScreenId::MySubscriptions,
            Box::new(my_subscriptions::MySubscriptionsScreen::new(Arc::clone(
                &vms.my_subscriptions,
            ))),
        ),
        (
            ScreenId::Reports,
            Box::new(reports::ReportsScreen::new(
                Arc::clone(&vms.reports),
                download_dir,
            )),
        ),
    ]
}

/// Run a view-model operation in the background. The view-model has
/// already put any failure on its notifier, so it is only logged here.
pub(crate) fn spawn_op<F, T>(op: &'static str, fut: F)
where
    F: Future<Output = Result<T, CoreError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = fut.await {
            debug!(op, error = %err, "operation failed");
        }
    });
}

/// Log a failed synchronous view-model call and drop the error.
pub(crate) fn logged<T>(op: &'static str, result: Result<T, CoreError>) -> Option<T> {
    result
        .inspect_err(|err| debug!(op, error = %err, "operation refused"))
        .ok()
}

// ── List cursor ──────────────────────────────────────────────────────

/// Selected row of a table, kept inside `0..len`.
#[derive(Debug, Default)]
pub struct Cursor {
    state: TableState,
}

impl Cursor {
    pub fn index(&self) -> usize {
        self.state.selected().unwrap_or(0)
    }

    pub fn select(&mut self, idx: usize, len: usize) {
        if len == 0 {
            self.state.select(None);
        } else {
            self.state.select(Some(idx.min(len - 1)));
        }
    }

    /// Re-clamp after the row count changed.
    pub fn clamp(&mut self, len: usize) {
        self.select(self.index(), len);
    }

    /// j/k, arrows, g/G and Ctrl-d/u. Returns false for other keys.
    pub fn handle_key(&mut self, key: KeyEvent, len: usize) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let idx = self.index();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.select(idx + 1, len),
            KeyCode::Char('k') | KeyCode::Up => self.select(idx.saturating_sub(1), len),
            KeyCode::Char('g') | KeyCode::Home => self.select(0, len),
            KeyCode::Char('G') | KeyCode::End => self.select(len.saturating_sub(1), len),
            KeyCode::Char('d') if ctrl => self.select(idx + 10, len),
            KeyCode::Char('u') if ctrl => self.select(idx.saturating_sub(10), len),
            _ => return false,
        }
        true
    }

    /// Copy of the table state for `render_stateful_widget`.
    pub fn state(&self) -> TableState {
        self.state
    }
}

// ── Shared chrome ────────────────────────────────────────────────────

pub(crate) fn panel(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            theme::border_focused()
        } else {
            theme::border_default()
        })
}

/// Spinner while loading, else the last load error, else the hints.
pub(crate) fn render_footer(
    frame: &mut Frame,
    area: Rect,
    throbber: &ThrobberState,
    loading: bool,
    last_error: Option<&str>,
    hints: Line<'static>,
) {
    if loading {
        let spinner = Throbber::default()
            .label("  Loading…")
            .style(Style::default().fg(theme::NEON_CYAN))
            .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
        frame.render_stateful_widget(spinner, area, &mut throbber.clone());
    } else if let Some(error) = last_error {
        let line = Line::from(vec![
            Span::styled("  ✗ ", Style::default().fg(theme::ERROR_RED)),
            Span::styled(error.to_owned(), Style::default().fg(theme::ERROR_RED)),
            Span::styled("   r ", theme::key_hint_key()),
            Span::styled("retry", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    } else {
        frame.render_widget(Paragraph::new(hints), area);
    }
}

/// Centered placeholder for empty tables.
pub(crate) fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let line = Line::from(Span::styled(format!("  {message}"), theme::key_hint()));
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use rwtool_core::{ConsoleConfig, Gateways, Role, Session};

    /// Gateways against an address nothing listens on. Construction
    /// never touches the network.
    pub fn gateways() -> Gateways {
        let url = "http://127.0.0.1:9".parse().expect("url");
        let config = ConsoleConfig::new(url, session());
        Gateways::http(config.client().expect("client"))
    }

    pub fn session() -> Session {
        Session::new("ann@corp.com", "Ann", Role::Admin).with_department("Finance")
    }

    pub fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    pub fn code(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{code, key};
    use super::*;

    #[test]
    fn cursor_stays_in_bounds() {
        let mut cursor = Cursor::default();
        cursor.select(0, 3);
        assert!(cursor.handle_key(key('j'), 3));
        assert!(cursor.handle_key(key('j'), 3));
        assert!(cursor.handle_key(key('j'), 3));
        assert_eq!(cursor.index(), 2);
        assert!(cursor.handle_key(key('g'), 3));
        assert_eq!(cursor.index(), 0);
        assert!(cursor.handle_key(code(KeyCode::Up), 3));
        assert_eq!(cursor.index(), 0);
        assert!(!cursor.handle_key(key('x'), 3));
    }

    #[test]
    fn cursor_clamps_when_rows_shrink() {
        let mut cursor = Cursor::default();
        cursor.select(5, 10);
        cursor.clamp(2);
        assert_eq!(cursor.index(), 1);
        cursor.clamp(0);
        assert_eq!(cursor.state().selected(), None);
    }
}
