//! The signed-in user's own requests, read only.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use throbber_widgets_tui::ThrobberState;

use rwtool_core::SubscriptionRequest;
use rwtool_core::screens::MySubscriptions;
use rwtool_core::screens::my_subscriptions::STATUS_CHOICES;

use super::{Cursor, panel, render_empty, render_footer, spawn_op};
use crate::action::Action;
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::{fmt, form, sub_tabs};

pub struct MySubscriptionsScreen {
    focused: bool,
    vm: Arc<MySubscriptions>,
    rows: Vec<Arc<SubscriptionRequest>>,
    cursor: Cursor,
    throbber: ThrobberState,
}

impl MySubscriptionsScreen {
    pub fn new(vm: Arc<MySubscriptions>) -> Self {
        Self {
            focused: false,
            vm,
            rows: Vec::new(),
            cursor: Cursor::default(),
            throbber: ThrobberState::default(),
        }
    }

    fn recompute(&mut self) {
        self.rows = self.vm.visible();
        self.cursor.clamp(self.rows.len());
    }
}

impl Component for MySubscriptionsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        self.cursor.handle_key(key, self.rows.len());
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DataChanged(ScreenId::MySubscriptions) => self.recompute(),
            Action::Refresh => {
                let vm = Arc::clone(&self.vm);
                spawn_op("load my requests", async move { vm.load().await });
            }
            Action::SearchInput(query) => {
                self.vm.filter().set_search(query.clone());
                self.recompute();
            }
            Action::CloseSearch => {
                self.vm.filter().set_search("");
                self.recompute();
            }
            Action::CycleFilter => {
                self.vm.filter().cycle_status(&STATUS_CHOICES);
                self.recompute();
            }
            Action::Tick => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let total = self.vm.requests().items().len();
        let title = format!(
            " My Subscriptions ({}/{total}) · {} ",
            self.rows.len(),
            self.vm.session().email
        );
        let block = panel(title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let filter = self.vm.filter().get();
        frame.render_widget(
            Paragraph::new(sub_tabs::status_tabs(&STATUS_CHOICES, &filter.status)),
            layout[0],
        );

        if self.rows.is_empty() {
            render_empty(frame, layout[1], "You have not requested any domains yet");
        } else {
            let header = Row::new(["Domain", "Reason", "Status", "Requested", "Reviewed"])
                .style(theme::table_header());
            let rows = self.rows.iter().map(|r| {
                let status = r.status.as_str().to_owned();
                Row::new([
                    Cell::from(r.domain_name.clone()).style(Style::default().fg(theme::CORAL)),
                    Cell::from(fmt::clip(fmt::or_dash(&r.request_reason), 48)),
                    Cell::from(status.clone()).style(Style::default().fg(theme::status_color(&status))),
                    Cell::from(fmt::date(r.requested)),
                    Cell::from(fmt::date(r.reviewed)),
                ])
                .style(theme::table_row())
            });
            let widths = [
                Constraint::Fill(1),
                Constraint::Fill(2),
                Constraint::Length(9),
                Constraint::Length(16),
                Constraint::Length(16),
            ];
            let table = Table::new(rows, widths)
                .header(header)
                .row_highlight_style(theme::table_selected())
                .highlight_symbol("▸");
            frame.render_stateful_widget(table, layout[1], &mut self.cursor.state());
        }

        if let Some(reason) = self
            .rows
            .get(self.cursor.index())
            .and_then(|r| r.rejection_reason.as_deref())
        {
            let line = Line::from(vec![
                Span::styled("  Rejected: ", theme::key_hint()),
                Span::styled(reason.to_owned(), Style::default().fg(theme::ERROR_RED)),
            ]);
            frame.render_widget(Paragraph::new(line), layout[2]);
        }

        let state = self.vm.requests().state();
        render_footer(
            frame,
            layout[3],
            &self.throbber,
            state.is_loading,
            state.last_error.as_deref(),
            form::hints(&[("f", "filter"), ("/", "search"), ("r", "refresh")]),
        );
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "My Subscriptions"
    }
}
