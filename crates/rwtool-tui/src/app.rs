//! Application core: event loop, screen management, action dispatch.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use rwtool_core::{Notice, NoticeLevel, Session};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::{ViewModels, create_screens};
use crate::theme;
use crate::tui::Tui;

/// A confirmation on screen. Once answered yes, a delete stays up
/// until its view-model closes the delete slot, so a failure leaves it
/// open for another try.
#[derive(Debug)]
struct PendingConfirm {
    action: ConfirmAction,
    /// Answered yes, operation still running.
    busy: bool,
}

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Screens already loaded once. Others load on first visit.
    visited: HashSet<ScreenId>,
    running: bool,
    help_visible: bool,
    search_active: bool,
    search_query: String,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    vms: ViewModels,
    session: Session,
    /// Server base URL, shown in the status bar.
    server: String,
    data_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<PendingConfirm>,
    /// Latest notice per screen; the active screen's one is shown.
    notices: HashMap<ScreenId, Notice>,
}

impl App {
    pub fn new(vms: ViewModels, session: Session, server: String, download_dir: PathBuf) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(&vms, download_dir).into_iter().collect();

        Self {
            active_screen: ScreenId::landing(session.role),
            previous_screen: None,
            screens,
            visited: HashSet::new(),
            running: true,
            help_visible: false,
            search_active: false,
            search_query: String::new(),
            action_tx,
            action_rx,
            vms,
            session,
            server,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notices: HashMap::new(),
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
            debug!(screen = screen.id(), "screen mounted");
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        self.load_once(self.active_screen)
    }

    /// Queue the first load of a screen's collections.
    fn load_once(&mut self, screen: ScreenId) -> Result<()> {
        if self.visited.insert(screen) {
            debug!(%screen, "first visit, loading");
            self.action_tx.send(Action::Refresh)?;
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let bridge = spawn_data_bridge(&self.vms, self.action_tx.clone(), self.data_cancel.clone());
        self.init_screens()?;

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(screen = %self.active_screen, user = %self.session.email, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        self.vms.discard();
        let _ = bridge.await;
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen keys go to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(pending) = &self.pending_confirm {
            if pending.busy {
                return Ok(None);
            }
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.search_active {
            return Ok(match key.code {
                KeyCode::Esc => {
                    self.search_query.clear();
                    Some(Action::CloseSearch)
                }
                KeyCode::Enter => Some(Action::SearchSubmit),
                KeyCode::Backspace => {
                    self.search_query.pop();
                    Some(Action::SearchInput(self.search_query.clone()))
                }
                KeyCode::Char(c) => {
                    self.search_query.push(c);
                    Some(Action::SearchInput(self.search_query.clone()))
                }
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        // An open dialog gets every key except Ctrl+C.
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.captures_input() {
                if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
                    return Ok(Some(Action::Quit));
                }
                return screen.handle_key_event(key);
            }
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('/')) => return Ok(Some(Action::OpenSearch)),
            (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::Refresh)),
            (KeyModifiers::NONE, KeyCode::Char('f')) => return Ok(Some(Action::CycleFilter)),

            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='7')) => {
                let screen = c
                    .to_digit(10)
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(ScreenId::from_number);
                if let Some(screen) = screen {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }

            (KeyModifiers::NONE, KeyCode::Esc) => {
                return Ok(Some(if self.notices.contains_key(&self.active_screen) {
                    Action::DismissNotice
                } else {
                    Action::GoBack
                }));
            }

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    /// Send an action to one screen and queue whatever it answers with.
    fn dispatch_to(&mut self, target: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&target) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Resize(..) | Action::Render => {}

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.previous_screen = Some(self.active_screen);
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                    self.load_once(*target)?;
                }
            }

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::OpenSearch => {
                self.search_active = true;
                self.search_query.clear();
            }

            Action::CloseSearch => {
                self.search_active = false;
                self.search_query.clear();
                self.dispatch_to(self.active_screen, action)?;
            }

            Action::SearchSubmit => self.search_active = false,

            // Data changes go to the screen they belong to, visible or not.
            Action::DataChanged(target) => {
                self.settle_confirm(*target, None);
                self.dispatch_to(*target, action)?;
            }

            Action::NoticeChanged(target, notice) => {
                self.settle_confirm(*target, notice.as_ref());
                match notice {
                    Some(notice) => {
                        self.notices.insert(*target, notice.clone());
                    }
                    None => {
                        self.notices.remove(target);
                    }
                }
            }

            Action::DismissNotice => self.vms.notifier(self.active_screen).dismiss(),

            Action::ShowConfirm(confirm) => {
                self.pending_confirm = Some(PendingConfirm {
                    action: confirm.clone(),
                    busy: false,
                });
            }

            Action::ConfirmYes => {
                let confirm = self.pending_confirm.as_ref().map(|p| p.action.clone());
                if let Some(confirm) = confirm {
                    if self.delete_slot_open(&confirm).is_some() {
                        if let Some(pending) = self.pending_confirm.as_mut() {
                            pending.busy = true;
                        }
                    } else {
                        self.pending_confirm = None;
                    }
                    self.action_tx.send(Action::Confirmed(confirm))?;
                }
            }

            Action::ConfirmNo => {
                if let Some(pending) = self.pending_confirm.take() {
                    self.action_tx.send(Action::Declined(pending.action))?;
                }
            }

            // Everything else goes to the active screen only.
            other => self.dispatch_to(self.active_screen, other)?,
        }
        Ok(())
    }

    /// Whether the view-model slot behind a delete confirmation is open.
    /// `None` for confirmations without one.
    fn delete_slot_open(&self, confirm: &ConfirmAction) -> Option<bool> {
        match confirm {
            ConfirmAction::DeleteDomain { .. } => Some(self.vms.domains.pending_delete().is_open()),
            ConfirmAction::DeleteGroup { .. } => Some(self.vms.groups.pending_delete().is_open()),
            ConfirmAction::CancelRequest { .. } => None,
        }
    }

    /// Follow a running delete: close the dialog once the view-model
    /// closed its slot, re-arm it when an error notice says it failed.
    fn settle_confirm(&mut self, screen: ScreenId, notice: Option<&Notice>) {
        let Some(pending) = &self.pending_confirm else {
            return;
        };
        if pending.action.screen() != screen {
            return;
        }
        match self.delete_slot_open(&pending.action) {
            Some(false) => self.pending_confirm = None,
            Some(true) if notice.is_some_and(|n| n.level == NoticeLevel::Error) => {
                if let Some(pending) = self.pending_confirm.as_mut() {
                    pending.busy = false;
                }
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays, last one on top.
        if let Some(notice) = self.notices.get(&self.active_screen) {
            Self::render_notice(frame, area, notice);
        }
        if let Some(ref pending) = self.pending_confirm {
            Self::render_confirm_dialog(frame, area, pending);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    /// Tab bar with every screen. Screens outside the role's usual set
    /// are muted but stay reachable.
    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else if id.suggested_for(self.session.role) {
                    theme::tab_inactive()
                } else {
                    theme::tab_muted()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(self.active_screen.index());
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if self.search_active {
            let line = Line::from(vec![
                Span::styled(" / ", Style::default().fg(theme::ELECTRIC_PURPLE)),
                Span::styled(&self.search_query, Style::default().fg(theme::NEON_CYAN)),
                Span::styled("█", Style::default().fg(theme::NEON_CYAN)),
                Span::styled("  Esc clear  Enter keep", theme::key_hint()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let mut spans = vec![
            Span::raw(" "),
            Span::styled(
                self.session.display_name().to_owned(),
                Style::default().fg(theme::NEON_CYAN),
            ),
            Span::styled(format!(" <{}>", self.session.email), theme::key_hint()),
            Span::styled(
                format!(" {}", self.session.role),
                Style::default().fg(theme::ELECTRIC_PURPLE),
            ),
            Span::styled(format!(" @ {}", self.server), theme::key_hint()),
        ];
        if !self.active_screen.suggested_for(self.session.role) {
            spans.push(Span::styled(
                " │ admin screen, server decides access",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ));
        }
        spans.push(Span::styled(" │ ? help  / search  q quit", theme::key_hint()));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 60u16.min(area.width.saturating_sub(4));
        let help_height = 22u16.min(area.height.saturating_sub(4));
        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);
        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let section = |title: &'static str| {
            Line::from(Span::styled(format!("  {title}"), Style::default().fg(theme::NEON_CYAN)))
        };
        let row = |key: &'static str, text: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(text, theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            section("Navigation"),
            row("1-7", "Jump to screen"),
            row("Tab", "Next screen"),
            row("j/k ↑/↓", "Move up/down"),
            row("g/G", "Top / bottom"),
            row("Ctrl+d/u", "Page down / up"),
            row("Esc", "Dismiss message / back"),
            Line::from(""),
            section("Lists"),
            row("/", "Search"),
            row("f", "Cycle status filter"),
            row("r", "Reload"),
            row("n e d", "New / edit / delete"),
            row("a x", "Approve / reject"),
            row("Enter", "Open / request access"),
            row("* Space", "Favorite / select report"),
            Line::from(""),
            row("?", "This help"),
            row("q", "Quit"),
        ];
        frame.render_widget(Paragraph::new(help_text), inner);
    }

    fn render_confirm_dialog(frame: &mut Frame, area: Rect, pending: &PendingConfirm) {
        let width = 56u16.min(area.width.saturating_sub(4));
        let height = 5u16;
        let x = (area.width.saturating_sub(width)) / 2;
        let y = (area.height.saturating_sub(height)) / 2;
        let dialog_area = Rect::new(area.x + x, area.y + y, width, height);

        frame.render_widget(Clear, dialog_area);
        let block = Block::default()
            .title(" Confirm ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let keys = if pending.busy {
            Line::from(Span::styled("  Working…", Style::default().fg(theme::NEON_CYAN)))
        } else {
            Line::from(vec![
                Span::styled("  y ", theme::key_hint_key()),
                Span::styled("confirm    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ])
        };
        let text = vec![
            Line::from(Span::styled(
                format!("  {}", pending.action),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
            keys,
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }

    /// Toast in the bottom-right corner, above the status bar.
    fn render_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
        let msg_len = u16::try_from(notice.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len.saturating_add(6).clamp(20, 70).min(area.width);
        let height = 3u16;
        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2);
        let toast_area = Rect::new(area.x + x, area.y + y, width, height);

        let (border_color, icon) = theme::notice_style(notice.level);

        frame.render_widget(Clear, toast_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(&notice.message, Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    use rwtool_core::{Domain, NoticeLevel, NoticeTimings, Role};

    use super::*;
    use crate::screens::fixtures::{code, gateways, key, session};

    fn app_for(session: Session) -> App {
        let vms = ViewModels::new(&gateways(), &session, NoticeTimings::default());
        App::new(vms, session, "http://127.0.0.1:9".into(), PathBuf::from("."))
    }

    fn drain(app: &mut App) -> Vec<Action> {
        std::iter::from_fn(|| app.action_rx.try_recv().ok()).collect()
    }

    #[tokio::test]
    async fn subscriber_lands_on_catalog() {
        let mut s = session();
        s.role = Role::User;
        let app = app_for(s);
        assert_eq!(app.active_screen, ScreenId::Catalog);
    }

    #[tokio::test]
    async fn first_visit_loads_once() {
        let mut app = app_for(session());
        app.process_action(&Action::SwitchScreen(ScreenId::Domains)).expect("switch");
        assert_eq!(drain(&mut app), vec![Action::Refresh]);

        app.process_action(&Action::SwitchScreen(ScreenId::Dashboard)).expect("switch");
        app.process_action(&Action::SwitchScreen(ScreenId::Domains)).expect("switch");
        assert_eq!(drain(&mut app), vec![Action::Refresh]);
        assert_eq!(app.active_screen, ScreenId::Domains);
    }

    #[tokio::test]
    async fn number_keys_switch_screens() {
        let mut app = app_for(session());
        assert_eq!(
            app.handle_key_event(key('3')).expect("key"),
            Some(Action::SwitchScreen(ScreenId::Approvals))
        );
        assert_eq!(app.handle_key_event(key('8')).expect("key"), None);
    }

    #[tokio::test]
    async fn open_dialog_takes_global_keys() {
        let mut app = app_for(session());
        app.process_action(&Action::SwitchScreen(ScreenId::Domains)).expect("switch");
        app.handle_key_event(key('n')).expect("key");
        assert_eq!(app.handle_key_event(key('q')).expect("key"), None);
        assert_eq!(app.vms.domains.editor().get().expect("open").draft.name, "q");
    }

    #[tokio::test]
    async fn confirm_answers_reach_the_screen() {
        let mut app = app_for(session());
        let confirm = ConfirmAction::DeleteDomain { name: "Finance".into() };
        app.process_action(&Action::ShowConfirm(confirm.clone())).expect("show");

        assert_eq!(app.handle_key_event(key('x')).expect("key"), None);
        assert_eq!(app.handle_key_event(key('y')).expect("key"), Some(Action::ConfirmYes));
        app.process_action(&Action::ConfirmYes).expect("yes");
        assert_eq!(drain(&mut app), vec![Action::Confirmed(confirm.clone())]);

        app.process_action(&Action::ShowConfirm(confirm.clone())).expect("show");
        assert_eq!(
            app.handle_key_event(code(KeyCode::Esc)).expect("key"),
            Some(Action::ConfirmNo)
        );
        app.process_action(&Action::ConfirmNo).expect("no");
        assert_eq!(drain(&mut app), vec![Action::Declined(confirm)]);
    }

    #[tokio::test]
    async fn failed_delete_keeps_confirm_up() {
        let mut app = app_for(session());
        let domain = Domain {
            id: "1".into(),
            name: "Finance".into(),
            description: String::new(),
            created: None,
        };
        app.vms.domains.pending_delete().open(Arc::new(domain));
        let confirm = ConfirmAction::DeleteDomain { name: "Finance".into() };
        app.process_action(&Action::ShowConfirm(confirm.clone())).expect("show");
        app.process_action(&Action::ConfirmYes).expect("yes");
        assert_eq!(drain(&mut app), vec![Action::Confirmed(confirm)]);

        // Still running: the dialog stays and ignores further answers.
        assert!(app.pending_confirm.as_ref().is_some_and(|p| p.busy));
        assert_eq!(app.handle_key_event(key('y')).expect("key"), None);

        // Nothing listens on the fixture address, so the delete fails.
        assert!(app.vms.domains.confirm_delete().await.is_err());
        let notice = app.vms.domains.notifier().current();
        assert_eq!(notice.as_ref().map(|n| n.level), Some(NoticeLevel::Error));
        app.process_action(&Action::NoticeChanged(ScreenId::Domains, notice)).expect("notice");

        assert!(app.pending_confirm.as_ref().is_some_and(|p| !p.busy));
        assert_eq!(app.handle_key_event(key('y')).expect("key"), Some(Action::ConfirmYes));

        // Closing the slot (success or decline) takes the dialog down.
        app.vms.domains.cancel_delete();
        app.process_action(&Action::DataChanged(ScreenId::Domains)).expect("data");
        assert!(app.pending_confirm.is_none());
    }

    #[tokio::test]
    async fn cancel_request_confirm_closes_on_yes() {
        let mut app = app_for(session());
        let confirm = ConfirmAction::CancelRequest {
            domain_id: "4".into(),
            domain: "Credit".into(),
        };
        app.process_action(&Action::ShowConfirm(confirm.clone())).expect("show");
        app.process_action(&Action::ConfirmYes).expect("yes");
        assert!(app.pending_confirm.is_none());
        assert_eq!(drain(&mut app), vec![Action::Confirmed(confirm)]);
    }

    #[tokio::test]
    async fn notices_are_kept_per_screen() {
        let mut app = app_for(session());
        let notice = Notice {
            id: 1,
            message: "Domain created".into(),
            level: NoticeLevel::Success,
        };
        app.process_action(&Action::NoticeChanged(ScreenId::Domains, Some(notice.clone())))
            .expect("notice");
        assert_eq!(app.notices.get(&ScreenId::Domains), Some(&notice));
        assert!(!app.notices.contains_key(&app.active_screen));

        app.process_action(&Action::NoticeChanged(ScreenId::Domains, None)).expect("clear");
        assert!(app.notices.is_empty());
    }

    #[tokio::test]
    async fn search_typing_builds_the_query() {
        let mut app = app_for(session());
        app.process_action(&Action::OpenSearch).expect("open");
        app.handle_key_event(key('f')).expect("key");
        assert_eq!(
            app.handle_key_event(key('i')).expect("key"),
            Some(Action::SearchInput("fi".into()))
        );
        assert_eq!(
            app.handle_key_event(code(KeyCode::Esc)).expect("key"),
            Some(Action::CloseSearch)
        );
    }
}
