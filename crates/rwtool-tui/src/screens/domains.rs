//! Domains screen: list, search, create/edit dialog, delete with confirm.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use throbber_widgets_tui::ThrobberState;

use rwtool_core::screens::DomainManagement;
use rwtool_core::{Domain, DomainDraft};

use super::{Cursor, logged, panel, render_empty, render_footer, spawn_op};
use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::{fmt, form};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Field {
    #[default]
    Name,
    Description,
}

impl Field {
    fn toggle(self) -> Self {
        match self {
            Self::Name => Self::Description,
            Self::Description => Self::Name,
        }
    }

    fn text(self, draft: &mut DomainDraft) -> &mut String {
        match self {
            Self::Name => &mut draft.name,
            Self::Description => &mut draft.description,
        }
    }
}

pub struct DomainsScreen {
    focused: bool,
    vm: Arc<DomainManagement>,
    rows: Vec<Arc<Domain>>,
    cursor: Cursor,
    field: Field,
    throbber: ThrobberState,
}

impl DomainsScreen {
    pub fn new(vm: Arc<DomainManagement>) -> Self {
        Self {
            focused: false,
            vm,
            rows: Vec::new(),
            cursor: Cursor::default(),
            field: Field::default(),
            throbber: ThrobberState::default(),
        }
    }

    fn recompute(&mut self) {
        self.rows = self.vm.visible();
        self.cursor.clamp(self.rows.len());
    }

    fn selected(&self) -> Option<&Arc<Domain>> {
        self.rows.get(self.cursor.index())
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.vm.close_editor(),
            KeyCode::Tab | KeyCode::BackTab => self.field = self.field.toggle(),
            KeyCode::Enter => {
                let vm = Arc::clone(&self.vm);
                spawn_op("save domain", async move { vm.save().await });
            }
            _ => {
                let field = self.field;
                self.vm.edit_draft(|d| {
                    form::edit_text(field.text(d), key);
                });
            }
        }
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let Some(editor) = self.vm.editor().get() else {
            return;
        };
        let title = if editor.is_edit() { "Edit Domain" } else { "New Domain" };
        let inner = form::dialog(frame, form::centered(area, 64, 8), title);
        let lines = vec![
            Line::from(""),
            form::field_line("Name", &editor.draft.name, self.field == Field::Name),
            form::field_line(
                "Description",
                &editor.draft.description,
                self.field == Field::Description,
            ),
            Line::from(""),
            form::hints(&[("Tab", "next field"), ("Enter", "save"), ("Esc", "cancel")]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for DomainsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.vm.editor().is_open() {
            self.handle_editor_key(key);
            return Ok(None);
        }
        if self.cursor.handle_key(key, self.rows.len()) {
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('n') => {
                self.field = Field::Name;
                self.vm.open_create();
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(domain) = self.selected().cloned() {
                    self.field = Field::Name;
                    logged("edit domain", self.vm.open_edit(&domain.id));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(domain) = self.selected().cloned() {
                    if logged("delete domain", self.vm.request_delete(&domain.id)).is_some() {
                        return Ok(Some(Action::ShowConfirm(ConfirmAction::DeleteDomain {
                            name: domain.name.clone(),
                        })));
                    }
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DataChanged(ScreenId::Domains) => self.recompute(),
            Action::Refresh => {
                let vm = Arc::clone(&self.vm);
                spawn_op("load domains", async move { vm.load().await });
            }
            Action::SearchInput(query) => {
                self.vm.filter().set_search(query.clone());
                self.recompute();
            }
            Action::CloseSearch => {
                self.vm.filter().set_search("");
                self.recompute();
            }
            Action::Confirmed(ConfirmAction::DeleteDomain { .. }) => {
                let vm = Arc::clone(&self.vm);
                spawn_op("delete domain", async move { vm.confirm_delete().await });
            }
            Action::Declined(ConfirmAction::DeleteDomain { .. }) => self.vm.cancel_delete(),
            Action::Tick => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let total = self.vm.domains().items().len();
        let search = self.vm.filter().get().search;
        let title = if search.is_empty() {
            format!(" Domains ({}/{total}) ", self.rows.len())
        } else {
            format!(" Domains ({}/{total}) [\"{search}\"] ", self.rows.len())
        };
        let block = panel(title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        if self.rows.is_empty() {
            render_empty(frame, layout[0], "No domains found");
        } else {
            let header = Row::new(["ID", "Name", "Description", "Created"])
                .style(theme::table_header());
            let rows = self.rows.iter().map(|d| {
                Row::new([
                    Cell::from(d.id.to_string()).style(Style::default().fg(theme::BORDER_GRAY)),
                    Cell::from(d.name.clone()).style(Style::default().fg(theme::NEON_CYAN)),
                    Cell::from(fmt::or_dash(&d.description).to_owned()),
                    Cell::from(fmt::date(d.created)),
                ])
                .style(theme::table_row())
            });
            let widths = [
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Fill(2),
                Constraint::Length(16),
            ];
            let table = Table::new(rows, widths)
                .header(header)
                .row_highlight_style(theme::table_selected())
                .highlight_symbol("▸");
            frame.render_stateful_widget(table, layout[0], &mut self.cursor.state());
        }

        let state = self.vm.domains().state();
        render_footer(
            frame,
            layout[1],
            &self.throbber,
            state.is_loading,
            state.last_error.as_deref(),
            form::hints(&[("n", "new"), ("e", "edit"), ("d", "delete"), ("r", "refresh")]),
        );

        self.render_editor(frame, area);
    }

    fn captures_input(&self) -> bool {
        self.vm.editor().is_open()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Domains"
    }
}
