//! Report browser: open, favorite, select and download report files.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, Wrap};
use throbber_widgets_tui::ThrobberState;
use tracing::info;

use rwtool_core::screens::report_viewer::DEFAULT_ZIP_NAME;
use rwtool_core::screens::ReportViewer;
use rwtool_core::{CoreError, ReportFile, ReportRef};

use super::{Cursor, panel, render_empty, render_footer, spawn_op};
use crate::action::Action;
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::{fmt, form};

pub struct ReportsScreen {
    focused: bool,
    vm: Arc<ReportViewer>,
    rows: Vec<Arc<ReportFile>>,
    selection: BTreeSet<ReportRef>,
    cursor: Cursor,
    download_dir: PathBuf,
    throbber: ThrobberState,
}

/// Await a download and write the bytes to `path`. Failures land on the
/// view-model's notifier either way.
fn save_to<F>(vm: Arc<ReportViewer>, path: PathBuf, download: F)
where
    F: Future<Output = Result<Bytes, CoreError>> + Send + 'static,
{
    tokio::spawn(async move {
        let Ok(bytes) = download.await else {
            return;
        };
        match tokio::fs::write(&path, &bytes).await {
            Ok(()) => {
                info!(path = %path.display(), bytes = bytes.len(), "report saved");
                vm.notifier().success(format!("Saved {}", path.display()));
            }
            Err(err) => {
                vm.notifier().error(format!("Could not write {}: {err}", path.display()));
            }
        }
    });
}

/// Target file inside `dir`, keeping only the final path component of
/// the server-provided name.
fn target_path(dir: &Path, file_name: &str) -> PathBuf {
    let name = Path::new(file_name)
        .file_name()
        .map_or_else(|| "report".into(), |n| n.to_string_lossy().into_owned());
    dir.join(name)
}

impl ReportsScreen {
    pub fn new(vm: Arc<ReportViewer>, download_dir: PathBuf) -> Self {
        Self {
            focused: false,
            vm,
            rows: Vec::new(),
            selection: BTreeSet::new(),
            cursor: Cursor::default(),
            download_dir,
            throbber: ThrobberState::default(),
        }
    }

    fn recompute(&mut self) {
        self.rows = self.vm.visible();
        self.selection = self.vm.selection();
        self.cursor.clamp(self.rows.len());
    }

    fn selected(&self) -> Option<ReportRef> {
        self.rows.get(self.cursor.index()).map(|f| f.reference())
    }

    fn download_one(&self, reference: ReportRef) {
        let vm = Arc::clone(&self.vm);
        let path = target_path(&self.download_dir, &reference.file_name);
        let fut = {
            let vm = Arc::clone(&vm);
            async move { vm.download(&reference).await }
        };
        save_to(vm, path, fut);
    }

    fn download_batch(&self) {
        let vm = Arc::clone(&self.vm);
        let path = self.download_dir.join(DEFAULT_ZIP_NAME);
        let fut = {
            let vm = Arc::clone(&vm);
            async move { vm.download_selected(None).await }
        };
        save_to(vm, path, fut);
    }

    fn handle_open_key(&self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.vm.close(),
            KeyCode::Char('d') => {
                if let Some(open) = self.vm.opened().get() {
                    self.download_one(open.reference);
                }
            }
            _ => {}
        }
    }

    fn render_open(&self, frame: &mut Frame, area: Rect) {
        let Some(open) = self.vm.opened().get() else {
            return;
        };
        let inner = form::dialog(frame, form::centered(area, 90, 12), &open.reference.file_name);
        let label = |s: &'static str| Span::styled(format!("  {s:<10}"), Style::default().fg(theme::DIM_WHITE));
        let mut lines = vec![
            Line::from(vec![
                label("Folder"),
                Span::styled(open.reference.folder.clone(), Style::default().fg(theme::CORAL)),
            ]),
            Line::from(vec![
                label("Preview"),
                Span::styled(open.preview_url.to_string(), Style::default().fg(theme::NEON_CYAN)),
            ]),
            Line::from(vec![
                label("Download"),
                Span::styled(open.download_url.to_string(), Style::default().fg(theme::NEON_CYAN)),
            ]),
        ];
        match open.metadata {
            Some(meta) => {
                lines.push(Line::from(vec![
                    label("Size"),
                    Span::raw(fmt::size(Some(meta.size))),
                ]));
                lines.push(Line::from(vec![
                    label("Type"),
                    Span::raw(meta.content_type.unwrap_or_else(|| fmt::DASH.into())),
                ]));
                if !meta.exists {
                    lines.push(Line::from(Span::styled(
                        "  File is missing from storage",
                        Style::default().fg(theme::ERROR_RED),
                    )));
                }
            }
            None => lines.push(Line::from(Span::styled("  Metadata unavailable", theme::key_hint()))),
        }
        lines.push(Line::from(""));
        lines.push(form::hints(&[("d", "download"), ("Esc", "close")]));
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

impl Component for ReportsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.vm.opened().is_open() {
            self.handle_open_key(key);
            return Ok(None);
        }
        if self.cursor.handle_key(key, self.rows.len()) {
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('D') => self.download_batch(),
            KeyCode::Char('c') => self.vm.clear_selection(),
            code => {
                let Some(reference) = self.selected() else {
                    return Ok(None);
                };
                match code {
                    KeyCode::Enter | KeyCode::Char('o') => {
                        let vm = Arc::clone(&self.vm);
                        spawn_op("open report", async move { vm.open(&reference).await });
                    }
                    KeyCode::Char('*') => {
                        let vm = Arc::clone(&self.vm);
                        spawn_op("toggle favorite", async move {
                            vm.toggle_favorite(&reference).await
                        });
                    }
                    KeyCode::Char(' ') => self.vm.toggle_selected(&reference),
                    KeyCode::Char('d') => self.download_one(reference),
                    _ => {}
                }
            }
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DataChanged(ScreenId::Reports) => self.recompute(),
            Action::Refresh => {
                let vm = Arc::clone(&self.vm);
                spawn_op("load reports", async move { vm.load().await });
            }
            Action::SearchInput(query) => {
                self.vm.filter().set_search(query.clone());
                self.recompute();
            }
            Action::CloseSearch => {
                self.vm.filter().set_search("");
                self.recompute();
            }
            Action::Tick => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let total = self.vm.files().items().len();
        let favorites = self.vm.favorites().items().len();
        let mut title = format!(" Reports ({}/{total}) · ★ {favorites} ", self.rows.len());
        if !self.selection.is_empty() {
            title.push_str(&format!("· {} selected ", self.selection.len()));
        }
        let block = panel(title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        if self.rows.is_empty() {
            render_empty(frame, layout[0], "No reports available for your groups");
        } else {
            let header = Row::new(["", "", "File", "Folder", "Size", "Modified"])
                .style(theme::table_header());
            let rows = self.rows.iter().map(|f| {
                let reference = f.reference();
                let star = if self.vm.is_favorite(&reference) { "★" } else { " " };
                let mark = if self.selection.contains(&reference) { "●" } else { " " };
                Row::new([
                    Cell::from(mark).style(Style::default().fg(theme::ELECTRIC_PURPLE)),
                    Cell::from(star).style(Style::default().fg(theme::ELECTRIC_YELLOW)),
                    Cell::from(f.file_name.clone()).style(Style::default().fg(theme::NEON_CYAN)),
                    Cell::from(f.folder.clone()).style(Style::default().fg(theme::CORAL)),
                    Cell::from(fmt::size(f.size)),
                    Cell::from(f.last_modified.clone().unwrap_or_else(|| fmt::DASH.into())),
                ])
                .style(theme::table_row())
            });
            let widths = [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(3),
                Constraint::Fill(1),
                Constraint::Length(10),
                Constraint::Length(20),
            ];
            let table = Table::new(rows, widths)
                .header(header)
                .row_highlight_style(theme::table_selected())
                .highlight_symbol("▸");
            frame.render_stateful_widget(table, layout[0], &mut self.cursor.state());
        }

        let state = self.vm.files().state();
        render_footer(
            frame,
            layout[1],
            &self.throbber,
            state.is_loading,
            state.last_error.as_deref(),
            form::hints(&[
                ("Enter", "open"),
                ("*", "favorite"),
                ("Space", "select"),
                ("d", "download"),
                ("D", "zip selected"),
            ]),
        );

        self.render_open(frame, area);
    }

    fn captures_input(&self) -> bool {
        self.vm.opened().is_open()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Reports"
    }
}

#[cfg(test)]
mod tests {
    use rwtool_core::Notifier;

    use super::*;
    use crate::screens::fixtures::{gateways, key, session};

    #[test]
    fn downloads_stay_inside_the_target_dir() {
        let dir = Path::new("/tmp/out");
        assert_eq!(target_path(dir, "q1.pdf"), dir.join("q1.pdf"));
        assert_eq!(target_path(dir, "../../etc/passwd"), dir.join("passwd"));
        assert_eq!(target_path(dir, ".."), dir.join("report"));
    }

    #[tokio::test]
    async fn clear_key_empties_the_selection() {
        let vm = Arc::new(ReportViewer::new(&gateways(), Notifier::default(), session()));
        vm.toggle_selected(&ReportRef::new("Finance", "q1.pdf"));
        let mut s = ReportsScreen::new(Arc::clone(&vm), PathBuf::from("."));
        s.recompute();
        assert_eq!(s.selection.len(), 1);

        s.handle_key_event(key('c')).expect("key");
        s.recompute();
        assert!(s.selection.is_empty());
    }
}
