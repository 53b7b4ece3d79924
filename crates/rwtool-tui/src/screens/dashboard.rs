//! Dashboard screen: subscription totals and the latest activity.
//!
//! Layout:
//! ┌─ Total ─┐┌─ Pending ─┐┌─ Approved ─┐┌─ Rejected ─┐
//! ├─ Approval rate gauge ──────────────────────────────┤
//! │ ┌─ Recent Requests ───────┐ ┌─ Recent Domains ───┐ │
//! │ └─────────────────────────┘ └────────────────────┘ │
//! └────────────────────────────────────────────────────┘

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};
use throbber_widgets_tui::ThrobberState;

use rwtool_core::screens::Dashboard;
use rwtool_core::{Domain, SubscriptionRequest, SubscriptionStats};

use super::{panel, render_footer, spawn_op};
use crate::action::Action;
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::{fmt, form};

pub struct DashboardScreen {
    focused: bool,
    vm: Arc<Dashboard>,
    stats: SubscriptionStats,
    recent_requests: Vec<Arc<SubscriptionRequest>>,
    recent_domains: Vec<Arc<Domain>>,
    throbber: ThrobberState,
}

impl DashboardScreen {
    pub fn new(vm: Arc<Dashboard>) -> Self {
        Self {
            focused: false,
            vm,
            stats: SubscriptionStats::default(),
            recent_requests: Vec::new(),
            recent_domains: Vec::new(),
            throbber: ThrobberState::default(),
        }
    }

    fn recompute(&mut self) {
        self.stats = self.vm.stats();
        self.recent_requests = self.vm.recent_requests();
        self.recent_domains = self.vm.recent_domains();
    }

    fn render_card(frame: &mut Frame, area: Rect, label: &str, value: u64, color: Color) {
        let block = Block::default()
            .title(format!(" {label} "))
            .title_style(Style::default().fg(theme::DIM_WHITE))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let text = Paragraph::new(Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(text, inner);
    }

    fn render_rate(&self, frame: &mut Frame, area: Rect) {
        let rate = self.stats.approval_rate.clamp(0.0, 100.0);
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title(" Approval rate ")
                    .title_style(Style::default().fg(theme::DIM_WHITE))
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(theme::border_default()),
            )
            .gauge_style(Style::default().fg(theme::SUCCESS_GREEN).bg(theme::BG_HIGHLIGHT))
            .ratio(rate / 100.0)
            .label(format!("{rate:.1}%"));
        frame.render_widget(gauge, area);
    }

    fn render_recent_requests(&self, frame: &mut Frame, area: Rect) {
        let block = panel(" Recent Requests ".into(), false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = if self.recent_requests.is_empty() {
            vec![Line::from(Span::styled("  No requests yet", theme::key_hint()))]
        } else {
            self.recent_requests
                .iter()
                .flat_map(|r| {
                    let status = r.status.as_str().to_owned();
                    [
                        Line::from(vec![
                            Span::styled(format!("  {}", r.user_name), Style::default().fg(theme::NEON_CYAN)),
                            Span::styled(" → ", theme::key_hint()),
                            Span::styled(r.domain_name.clone(), Style::default().fg(theme::CORAL)),
                            Span::raw("  "),
                            Span::styled(status.clone(), Style::default().fg(theme::status_color(&status))),
                        ]),
                        Line::from(Span::styled(
                            format!("    {}", fmt::date(r.requested)),
                            theme::key_hint(),
                        )),
                    ]
                })
                .collect()
        };
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_recent_domains(&self, frame: &mut Frame, area: Rect) {
        let block = panel(" Recent Domains ".into(), false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = if self.recent_domains.is_empty() {
            vec![Line::from(Span::styled("  No domains yet", theme::key_hint()))]
        } else {
            self.recent_domains
                .iter()
                .flat_map(|d| {
                    [
                        Line::from(Span::styled(format!("  {}", d.name), Style::default().fg(theme::NEON_CYAN))),
                        Line::from(Span::styled(
                            format!("    {}", fmt::clip(fmt::or_dash(&d.description), 40)),
                            theme::key_hint(),
                        )),
                    ]
                })
                .collect()
        };
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Char('a') => Some(Action::SwitchScreen(ScreenId::Approvals)),
            KeyCode::Char('d') => Some(Action::SwitchScreen(ScreenId::Domains)),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DataChanged(ScreenId::Dashboard) => self.recompute(),
            Action::Refresh => {
                let vm = Arc::clone(&self.vm);
                spawn_op("load dashboard", async move { vm.load().await });
            }
            Action::Tick => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel(
            format!(" Dashboard · {} pending review ", self.vm.pending_count()),
            self.focused,
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(inner);

        let cards = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(rows[0]);
        Self::render_card(frame, cards[0], "Total", self.stats.total, theme::NEON_CYAN);
        Self::render_card(frame, cards[1], "Pending", self.stats.pending, theme::ELECTRIC_YELLOW);
        Self::render_card(frame, cards[2], "Approved", self.stats.approved, theme::SUCCESS_GREEN);
        Self::render_card(frame, cards[3], "Rejected", self.stats.rejected, theme::ERROR_RED);

        self.render_rate(frame, rows[1]);

        let lists = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[2]);
        self.render_recent_requests(frame, lists[0]);
        self.render_recent_domains(frame, lists[1]);

        let requests = self.vm.requests().state();
        let domains = self.vm.domains().state();
        let last_error = requests.last_error.or(domains.last_error);
        render_footer(
            frame,
            rows[3],
            &self.throbber,
            requests.is_loading || domains.is_loading,
            last_error.as_deref(),
            form::hints(&[("a", "approvals"), ("d", "domains"), ("r", "refresh")]),
        );
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Dashboard"
    }
}
