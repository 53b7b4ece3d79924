//! User group access: AD group to report folder mapping.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use throbber_widgets_tui::ThrobberState;

use rwtool_core::UserGroup;
use rwtool_core::screens::UserGroupAccess;

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
    Domain,
    Members,
    Folders,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::Domain,
            Self::Domain => Self::Members,
            Self::Members => Self::Folders,
            Self::Folders => Self::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Name => Self::Folders,
            Self::Domain => Self::Name,
            Self::Members => Self::Domain,
            Self::Folders => Self::Members,
        }
    }
}

/// Comma-separated member list into trimmed, non-empty entries.
fn parse_members(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
        .collect()
}

pub struct GroupsScreen {
    focused: bool,
    vm: Arc<UserGroupAccess>,
    rows: Vec<Arc<UserGroup>>,
    cursor: Cursor,
    field: Field,
    /// Members as typed; parsed into the draft on every edit.
    members_text: String,
    folder_cursor: usize,
    throbber: ThrobberState,
}

impl GroupsScreen {
    pub fn new(vm: Arc<UserGroupAccess>) -> Self {
        Self {
            focused: false,
            vm,
            rows: Vec::new(),
            cursor: Cursor::default(),
            field: Field::default(),
            members_text: String::new(),
            folder_cursor: 0,
            throbber: ThrobberState::default(),
        }
    }

    fn recompute(&mut self) {
        self.rows = self.vm.visible();
        self.cursor.clamp(self.rows.len());
    }

    fn selected(&self) -> Option<&Arc<UserGroup>> {
        self.rows.get(self.cursor.index())
    }

    fn reset_form(&mut self, members: &[String]) {
        self.field = Field::Name;
        self.members_text = members.join(", ");
        self.folder_cursor = 0;
    }

    /// Step the associated domain through the known domains, with an
    /// empty slot for "none".
    fn cycle_domain(&self, forward: bool) {
        let mut names: Vec<String> = vec![String::new()];
        names.extend(self.vm.domains().items().iter().map(|d| d.name.clone()));
        self.vm.edit_draft(|d| {
            let pos = names
                .iter()
                .position(|n| *n == d.associated_domain)
                .unwrap_or(0);
            let next = if forward {
                (pos + 1) % names.len()
            } else {
                (pos + names.len() - 1) % names.len()
            };
            d.associated_domain.clone_from(&names[next]);
        });
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.vm.close_editor(),
            KeyCode::Tab => self.field = self.field.next(),
            KeyCode::BackTab => self.field = self.field.prev(),
            KeyCode::Enter => {
                let vm = Arc::clone(&self.vm);
                spawn_op("save user group", async move { vm.save().await });
            }
            _ => match self.field {
                Field::Name => self.vm.edit_draft(|d| {
                    form::edit_text(&mut d.ad_group_name, key);
                }),
                Field::Domain => match key.code {
                    KeyCode::Right | KeyCode::Char(' ' | 'l') => self.cycle_domain(true),
                    KeyCode::Left | KeyCode::Char('h') => self.cycle_domain(false),
                    _ => {}
                },
                Field::Members => {
                    if form::edit_text(&mut self.members_text, key) {
                        let members = parse_members(&self.members_text);
                        self.vm.edit_draft(|d| d.members = members);
                    }
                }
                Field::Folders => {
                    let folders = self.vm.folders().items();
                    match key.code {
                        KeyCode::Char('j') | KeyCode::Down => {
                            self.folder_cursor =
                                (self.folder_cursor + 1).min(folders.len().saturating_sub(1));
                        }
                        KeyCode::Char('k') | KeyCode::Up => {
                            self.folder_cursor = self.folder_cursor.saturating_sub(1);
                        }
                        KeyCode::Char(' ') => {
                            if let Some(folder) = folders.get(self.folder_cursor) {
                                self.vm.toggle_folder(folder.name());
                            }
                        }
                        _ => {}
                    }
                }
            },
        }
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let Some(editor) = self.vm.editor().get() else {
            return;
        };
        let folders = self.vm.folders().items();
        let height = u16::try_from(folders.len().min(10)).unwrap_or(10) + 10;
        let title = if editor.is_edit() { "Edit User Group" } else { "New User Group" };
        let inner = form::dialog(frame, form::centered(area, 70, height), title);

        let draft = &editor.draft;
        let domain = if draft.associated_domain.is_empty() {
            "(none)  ←/→"
        } else {
            draft.associated_domain.as_str()
        };
        let mut lines = vec![
            Line::from(""),
            form::field_line("AD group", &draft.ad_group_name, self.field == Field::Name),
            form::field_line("Domain", domain, self.field == Field::Domain),
            form::field_line("Members", &self.members_text, self.field == Field::Members),
            Line::from(Span::styled(
                "  Folders",
                if self.field == Field::Folders {
                    Style::default().fg(theme::ELECTRIC_PURPLE)
                } else {
                    Style::default().fg(theme::DIM_WHITE)
                },
            )),
        ];
        if folders.is_empty() {
            lines.push(Line::from(Span::styled("    no folders available", theme::key_hint())));
        }
        for (i, folder) in folders.iter().enumerate().take(10) {
            let checked = draft.folder_access.iter().any(|f| f == folder.name());
            let pointer = if self.field == Field::Folders && i == self.folder_cursor {
                "▸"
            } else {
                " "
            };
            let style = if checked {
                Style::default().fg(theme::SUCCESS_GREEN)
            } else {
                theme::table_row()
            };
            lines.push(Line::from(Span::styled(
                format!("   {pointer} [{}] {}", if checked { "x" } else { " " }, folder.name()),
                style,
            )));
        }
        lines.push(Line::from(""));
        lines.push(form::hints(&[
            ("Tab", "next field"),
            ("Space", "toggle"),
            ("Enter", "save"),
            ("Esc", "cancel"),
        ]));
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for GroupsScreen {
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
                self.reset_form(&[]);
                self.vm.open_create();
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(group) = self.selected().cloned() {
                    self.reset_form(&group.members);
                    logged("edit user group", self.vm.open_edit(group.id));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(group) = self.selected().cloned() {
                    if logged("delete user group", self.vm.request_delete(group.id)).is_some() {
                        return Ok(Some(Action::ShowConfirm(ConfirmAction::DeleteGroup {
                            name: group.ad_group_name.clone(),
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
            Action::DataChanged(ScreenId::Groups) => self.recompute(),
            Action::Refresh => {
                let vm = Arc::clone(&self.vm);
                spawn_op("load user groups", async move { vm.load().await });
            }
            Action::SearchInput(query) => {
                self.vm.filter().set_search(query.clone());
                self.recompute();
            }
            Action::CloseSearch => {
                self.vm.filter().set_search("");
                self.recompute();
            }
            Action::Confirmed(ConfirmAction::DeleteGroup { .. }) => {
                let vm = Arc::clone(&self.vm);
                spawn_op("delete user group", async move { vm.confirm_delete().await });
            }
            Action::Declined(ConfirmAction::DeleteGroup { .. }) => self.vm.cancel_delete(),
            Action::Tick => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let total = self.vm.groups().items().len();
        let title = format!(" User Groups ({}/{total}) ", self.rows.len());
        let block = panel(title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        if self.rows.is_empty() {
            render_empty(frame, layout[0], "No user groups found");
        } else {
            let header = Row::new(["AD Group", "Domain", "Folders", "Members", "Updated"])
                .style(theme::table_header());
            let rows = self.rows.iter().map(|g| {
                Row::new([
                    Cell::from(g.ad_group_name.clone()).style(Style::default().fg(theme::NEON_CYAN)),
                    Cell::from(g.associated_domain.clone().unwrap_or_else(|| fmt::DASH.into()))
                        .style(Style::default().fg(theme::CORAL)),
                    Cell::from(fmt::clip(&g.folder_access.join(", "), 40)),
                    Cell::from(g.members.len().to_string()),
                    Cell::from(fmt::date(g.updated.or(g.created))),
                ])
                .style(theme::table_row())
            });
            let widths = [
                Constraint::Fill(2),
                Constraint::Fill(1),
                Constraint::Fill(3),
                Constraint::Length(8),
                Constraint::Length(16),
            ];
            let table = Table::new(rows, widths)
                .header(header)
                .row_highlight_style(theme::table_selected())
                .highlight_symbol("▸");
            frame.render_stateful_widget(table, layout[0], &mut self.cursor.state());
        }

        let state = self.vm.groups().state();
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
        "User Groups"
    }
}

#[cfg(test)]
mod tests {
    use rwtool_core::Notifier;

    use super::*;
    use crate::screens::fixtures::{code, gateways, key};

    fn screen() -> GroupsScreen {
        GroupsScreen::new(Arc::new(UserGroupAccess::new(&gateways(), Notifier::default())))
    }

    #[test]
    fn members_split_on_commas() {
        assert_eq!(
            parse_members(" ann@corp.com, ,bob@corp.com ,"),
            vec!["ann@corp.com".to_owned(), "bob@corp.com".to_owned()]
        );
    }

    #[tokio::test]
    async fn editor_fields_reach_the_draft() {
        let mut s = screen();
        s.handle_key_event(key('n')).expect("key");
        for c in "FIN-RO".chars() {
            s.handle_key_event(key(c)).expect("key");
        }
        s.handle_key_event(code(KeyCode::Tab)).expect("key");
        s.handle_key_event(code(KeyCode::Tab)).expect("key");
        for c in "a@x, b@x".chars() {
            s.handle_key_event(key(c)).expect("key");
        }

        let draft = s.vm.editor().get().expect("editor open").draft;
        assert_eq!(draft.ad_group_name, "FIN-RO");
        assert_eq!(draft.members, vec!["a@x".to_owned(), "b@x".to_owned()]);
        assert!(draft.associated_domain.is_empty());
    }

    #[tokio::test]
    async fn domain_field_cycles_back_to_none_without_domains() {
        let mut s = screen();
        s.handle_key_event(key('n')).expect("key");
        s.handle_key_event(code(KeyCode::Tab)).expect("key");
        s.handle_key_event(code(KeyCode::Right)).expect("key");
        let draft = s.vm.editor().get().expect("editor open").draft;
        assert!(draft.associated_domain.is_empty());
    }
}
