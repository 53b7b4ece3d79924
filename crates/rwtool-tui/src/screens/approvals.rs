//! Approval queue: every request, approve pending ones, reject with a
//! reason picked from presets or typed in.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use strum::IntoEnumIterator;
use throbber_widgets_tui::ThrobberState;

use rwtool_core::screens::approvals::STATUS_CHOICES;
use rwtool_core::screens::{ApprovalQueue, ApprovalRow, RejectDialog, RejectionChoice};

use super::{Cursor, logged, panel, render_empty, render_footer, spawn_op};
use crate::action::Action;
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::{fmt, form, sub_tabs};

pub struct ApprovalsScreen {
    focused: bool,
    vm: Arc<ApprovalQueue>,
    rows: Vec<ApprovalRow>,
    cursor: Cursor,
    throbber: ThrobberState,
}

impl ApprovalsScreen {
    pub fn new(vm: Arc<ApprovalQueue>) -> Self {
        Self {
            focused: false,
            vm,
            rows: Vec::new(),
            cursor: Cursor::default(),
            throbber: ThrobberState::default(),
        }
    }

    fn recompute(&mut self) {
        self.rows = self.vm.rows();
        self.cursor.clamp(self.rows.len());
    }

    fn selected(&self) -> Option<&ApprovalRow> {
        self.rows.get(self.cursor.index())
    }

    fn handle_reject_key(&mut self, dialog: &RejectDialog, key: KeyEvent) {
        let choices: Vec<RejectionChoice> = RejectionChoice::iter().collect();
        let current = dialog
            .choice
            .and_then(|c| choices.iter().position(|&x| x == c));

        match key.code {
            KeyCode::Esc => self.vm.close_reject(),
            KeyCode::Enter => {
                let vm = Arc::clone(&self.vm);
                spawn_op("reject request", async move { vm.confirm_reject().await });
            }
            KeyCode::Down | KeyCode::Tab => {
                let next = current.map_or(0, |i| (i + 1) % choices.len());
                self.vm.choose_reason(choices[next]);
            }
            KeyCode::Up | KeyCode::BackTab => {
                let prev = current.map_or(choices.len() - 1, |i| {
                    (i + choices.len() - 1) % choices.len()
                });
                self.vm.choose_reason(choices[prev]);
            }
            _ if dialog.choice == Some(RejectionChoice::Other) => {
                let mut text = dialog.other_text.clone();
                if form::edit_text(&mut text, key) {
                    self.vm.set_other_text(text);
                }
            }
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c.to_digit(10).and_then(|d| usize::try_from(d).ok()).unwrap_or(1) - 1;
                if let Some(&choice) = choices.get(idx) {
                    self.vm.choose_reason(choice);
                }
            }
            _ => {}
        }
    }

    fn render_reject(&self, frame: &mut Frame, area: Rect) {
        let Some(dialog) = self.vm.reject_dialog().get() else {
            return;
        };
        let inner = form::dialog(frame, form::centered(area, 72, 14), "Reject Request");

        let request = &dialog.request;
        let mut lines = vec![
            Line::from(vec![
                Span::styled("  ", Style::default()),
                Span::styled(request.user_name.clone(), Style::default().fg(theme::NEON_CYAN)),
                Span::styled(" → ", theme::key_hint()),
                Span::styled(request.domain_name.clone(), Style::default().fg(theme::CORAL)),
                Span::styled(
                    format!("   dept: {}", request.department()),
                    theme::key_hint(),
                ),
            ]),
            Line::from(""),
        ];
        for (i, choice) in RejectionChoice::iter().enumerate() {
            let selected = dialog.choice == Some(choice);
            let marker = if selected { "●" } else { "○" };
            let style = if selected {
                Style::default().fg(theme::ELECTRIC_PURPLE)
            } else {
                theme::table_row()
            };
            lines.push(Line::from(Span::styled(
                format!("  {} {marker} {}", i + 1, choice.text()),
                style,
            )));
        }
        if dialog.choice == Some(RejectionChoice::Other) {
            lines.push(form::field_line("Reason", &dialog.other_text, true));
        }
        lines.push(Line::from(""));
        lines.push(form::hints(&[
            ("1-5/↑↓", "reason"),
            ("Enter", "reject"),
            ("Esc", "cancel"),
        ]));
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let Some(row) = self.selected() else {
            return;
        };
        let r = &row.request;
        let mut lines = vec![Line::from(vec![
            Span::styled("  Reason   ", theme::key_hint()),
            Span::styled(
                fmt::or_dash(&r.request_reason).to_owned(),
                Style::default().fg(theme::DIM_WHITE),
            ),
        ])];
        if let Some(rejection) = r.rejection_reason.as_deref() {
            lines.push(Line::from(vec![
                Span::styled("  Rejected ", theme::key_hint()),
                Span::styled(rejection.to_owned(), Style::default().fg(theme::ERROR_RED)),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }
}

impl Component for ApprovalsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(dialog) = self.vm.reject_dialog().get() {
            self.handle_reject_key(&dialog, key);
            return Ok(None);
        }
        if self.cursor.handle_key(key, self.rows.len()) {
            return Ok(None);
        }

        let Some(id) = self.selected().map(|r| r.request.id.clone()) else {
            return Ok(None);
        };
        match key.code {
            KeyCode::Char('a') => {
                let vm = Arc::clone(&self.vm);
                spawn_op("approve request", async move { vm.approve(&id).await });
            }
            KeyCode::Char('x') => {
                logged("open reject", self.vm.open_reject(&id));
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DataChanged(ScreenId::Approvals) => self.recompute(),
            Action::Refresh => {
                let vm = Arc::clone(&self.vm);
                spawn_op("load requests", async move { vm.load().await });
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
            " Approvals ({}/{total}) · {} pending ",
            self.rows.len(),
            self.vm.pending_count()
        );
        let block = panel(title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

        let filter = self.vm.filter().get();
        frame.render_widget(
            Paragraph::new(sub_tabs::status_tabs(&STATUS_CHOICES, &filter.status)),
            layout[0],
        );

        if self.rows.is_empty() {
            render_empty(frame, layout[1], "No subscription requests");
        } else {
            let header = Row::new(["User", "Email", "Department", "Domain", "Status", "Requested", ""])
                .style(theme::table_header());
            let rows = self.rows.iter().map(|row| {
                let r = &row.request;
                let status = r.status.as_str().to_owned();
                let (flag, flag_color) = if row.department_match {
                    ("✓", theme::SUCCESS_GREEN)
                } else {
                    ("≠", theme::ELECTRIC_YELLOW)
                };
                Row::new([
                    Cell::from(r.user_name.clone()).style(Style::default().fg(theme::NEON_CYAN)),
                    Cell::from(r.user_email.clone()),
                    Cell::from(r.department().to_owned()),
                    Cell::from(r.domain_name.clone()).style(Style::default().fg(theme::CORAL)),
                    Cell::from(status.clone()).style(Style::default().fg(theme::status_color(&status))),
                    Cell::from(fmt::date(r.requested)),
                    Cell::from(flag).style(Style::default().fg(flag_color)),
                ])
                .style(theme::table_row())
            });
            let widths = [
                Constraint::Fill(2),
                Constraint::Fill(3),
                Constraint::Fill(2),
                Constraint::Fill(2),
                Constraint::Length(9),
                Constraint::Length(16),
                Constraint::Length(2),
            ];
            let table = Table::new(rows, widths)
                .header(header)
                .row_highlight_style(theme::table_selected())
                .highlight_symbol("▸");
            frame.render_stateful_widget(table, layout[1], &mut self.cursor.state());
        }

        self.render_detail(frame, layout[2]);

        let hints = if self.selected().is_some_and(|r| r.can_review) {
            form::hints(&[("a", "approve"), ("x", "reject"), ("f", "filter"), ("r", "refresh")])
        } else {
            form::hints(&[("f", "filter"), ("/", "search"), ("r", "refresh")])
        };
        let state = self.vm.requests().state();
        render_footer(
            frame,
            layout[3],
            &self.throbber,
            state.is_loading,
            state.last_error.as_deref(),
            hints,
        );

        self.render_reject(frame, area);
    }

    fn captures_input(&self) -> bool {
        self.vm.reject_dialog().is_open()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Approvals"
    }
}

#[cfg(test)]
mod tests {
    use rwtool_core::{Notifier, StatusFilter};

    use super::*;
    use crate::screens::fixtures::gateways;

    #[tokio::test]
    async fn f_cycles_through_review_states() {
        let mut s = ApprovalsScreen::new(Arc::new(ApprovalQueue::new(&gateways(), Notifier::default())));
        s.update(&Action::CycleFilter).expect("update");
        assert_eq!(s.vm.filter().get().status, StatusFilter::Only("PENDING".into()));
        s.update(&Action::CycleFilter).expect("update");
        s.update(&Action::CycleFilter).expect("update");
        s.update(&Action::CycleFilter).expect("update");
        assert_eq!(s.vm.filter().get().status, StatusFilter::All);
    }
}
