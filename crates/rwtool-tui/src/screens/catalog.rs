//! Domain catalog: every domain with the user's own request status.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, Wrap};
use throbber_widgets_tui::ThrobberState;

use rwtool_core::screens::catalog::STATUS_CHOICES;
use rwtool_core::screens::{Catalog, CatalogEntry};

use super::{Cursor, logged, panel, render_empty, render_footer, spawn_op};
use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::{fmt, form, sub_tabs};

pub struct CatalogScreen {
    focused: bool,
    vm: Arc<Catalog>,
    rows: Vec<Arc<CatalogEntry>>,
    cursor: Cursor,
    throbber: ThrobberState,
}

impl CatalogScreen {
    pub fn new(vm: Arc<Catalog>) -> Self {
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

    fn selected(&self) -> Option<&Arc<CatalogEntry>> {
        self.rows.get(self.cursor.index())
    }

    fn handle_dialog_key(&mut self, reason: &str, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.vm.close_request(),
            KeyCode::Enter => {
                let vm = Arc::clone(&self.vm);
                spawn_op("submit request", async move { vm.submit_request().await });
            }
            _ => {
                let mut text = reason.to_owned();
                if form::edit_text(&mut text, key) {
                    self.vm.set_reason(text);
                }
            }
        }
    }

    fn render_dialog(&self, frame: &mut Frame, area: Rect) {
        let Some(dialog) = self.vm.dialog().get() else {
            return;
        };
        let inner = form::dialog(frame, form::centered(area, 70, 10), "Request Access");
        let mut lines = vec![
            Line::from(vec![
                Span::styled("  Domain      ", Style::default().fg(theme::DIM_WHITE)),
                Span::styled(dialog.domain.name.clone(), Style::default().fg(theme::CORAL)),
            ]),
            Line::from(Span::styled(
                format!("  {}", fmt::or_dash(&dialog.domain.description)),
                theme::key_hint(),
            )),
            Line::from(""),
            form::field_line("Reason", &dialog.reason, true),
        ];
        if let Some(error) = dialog.error.as_deref() {
            lines.push(Line::from(Span::styled(
                format!("  ✗ {error}"),
                Style::default().fg(theme::ERROR_RED),
            )));
        } else {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(""));
        lines.push(form::hints(&[("Enter", "submit"), ("Esc", "cancel")]));
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

impl Component for CatalogScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(dialog) = self.vm.dialog().get() {
            self.handle_dialog_key(&dialog.reason, key);
            return Ok(None);
        }
        if self.cursor.handle_key(key, self.rows.len()) {
            return Ok(None);
        }

        let Some(entry) = self.selected().cloned() else {
            return Ok(None);
        };
        match key.code {
            KeyCode::Char('n') | KeyCode::Enter => {
                logged("open request", self.vm.open_request(&entry.domain.id));
            }
            KeyCode::Char('c') if entry.can_cancel() => {
                return Ok(Some(Action::ShowConfirm(ConfirmAction::CancelRequest {
                    domain_id: entry.domain.id.clone(),
                    domain: entry.domain.name.clone(),
                })));
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DataChanged(ScreenId::Catalog) => self.recompute(),
            Action::Refresh => {
                let vm = Arc::clone(&self.vm);
                spawn_op("load catalog", async move { vm.load().await });
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
            Action::Confirmed(ConfirmAction::CancelRequest { domain_id, .. }) => {
                let vm = Arc::clone(&self.vm);
                let id = domain_id.clone();
                spawn_op("cancel request", async move { vm.cancel_request(&id).await });
            }
            Action::Tick => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let counts = self.vm.counts();
        let title = format!(
            " Catalog ({}) · {} pending · {} approved · {} rejected ",
            counts.total, counts.pending, counts.approved, counts.rejected
        );
        let block = panel(title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let filter = self.vm.filter().get();
        frame.render_widget(
            Paragraph::new(sub_tabs::status_tabs(&STATUS_CHOICES, &filter.status)),
            layout[0],
        );

        if self.rows.is_empty() {
            render_empty(frame, layout[1], "No domains match");
        } else {
            let header = Row::new(["Domain", "Description", "Status", "Requested"])
                .style(theme::table_header());
            let rows = self.rows.iter().map(|e| {
                let status = e.status.clone().unwrap_or_else(|| "available".into());
                Row::new([
                    Cell::from(e.domain.name.clone()).style(Style::default().fg(theme::NEON_CYAN)),
                    Cell::from(fmt::or_dash(&e.domain.description).to_owned()),
                    Cell::from(status.clone()).style(Style::default().fg(theme::status_color(&status))),
                    Cell::from(fmt::date(e.request.as_ref().and_then(|r| r.requested))),
                ])
                .style(theme::table_row())
            });
            let widths = [
                Constraint::Fill(1),
                Constraint::Fill(2),
                Constraint::Length(10),
                Constraint::Length(16),
            ];
            let table = Table::new(rows, widths)
                .header(header)
                .row_highlight_style(theme::table_selected())
                .highlight_symbol("▸");
            frame.render_stateful_widget(table, layout[1], &mut self.cursor.state());
        }

        let hints = match self.selected() {
            Some(e) if e.can_request() => {
                form::hints(&[("Enter", "request access"), ("f", "filter"), ("r", "refresh")])
            }
            Some(e) if e.can_cancel() => {
                form::hints(&[("c", "cancel request"), ("f", "filter"), ("r", "refresh")])
            }
            _ => form::hints(&[("f", "filter"), ("/", "search"), ("r", "refresh")]),
        };
        let state = self.vm.entries().state();
        render_footer(
            frame,
            layout[2],
            &self.throbber,
            state.is_loading,
            state.last_error.as_deref(),
            hints,
        );

        self.render_dialog(frame, area);
    }

    fn captures_input(&self) -> bool {
        self.vm.dialog().is_open()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Catalog"
    }
}

#[cfg(test)]
mod tests {
    use rwtool_core::{Notifier, StatusFilter};

    use super::*;
    use crate::screens::fixtures::{gateways, key, session};

    fn screen() -> CatalogScreen {
        CatalogScreen::new(Arc::new(Catalog::new(&gateways(), Notifier::default(), session())))
    }

    #[tokio::test]
    async fn keys_without_entries_open_nothing() {
        let mut s = screen();
        assert_eq!(s.handle_key_event(key('n')).expect("key"), None);
        assert_eq!(s.handle_key_event(key('c')).expect("key"), None);
        assert!(!s.captures_input());
    }

    #[tokio::test]
    async fn filter_uses_lower_case_statuses() {
        let mut s = screen();
        s.update(&Action::CycleFilter).expect("update");
        assert_eq!(s.vm.filter().get().status, StatusFilter::Only("pending".into()));
    }
}
