//! Dialog frames and single-line text fields.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear};

use crate::theme;

/// A `width` × `height` rectangle centered in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Clear `area` and draw a titled dialog border. Returns the inner area.
pub fn dialog(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// `  Label      value█` with the cursor shown on the focused field.
pub fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(theme::ELECTRIC_PURPLE)
    } else {
        Style::default().fg(theme::DIM_WHITE)
    };
    let mut spans = vec![
        Span::styled(format!("  {label:<12}"), label_style),
        Span::styled(value, Style::default().fg(theme::NEON_CYAN)),
    ];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(theme::NEON_CYAN)));
    }
    Line::from(spans)
}

/// Key hints line: `("Enter", "save")` pairs.
pub fn hints(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (key, label) in pairs {
        spans.push(Span::styled(format!("{key} "), theme::key_hint_key()));
        spans.push(Span::styled(format!("{label}  "), theme::key_hint()));
    }
    Line::from(spans)
}

/// Apply a typing key to `text`. Returns false for keys that are not
/// text editing, so callers can handle them.
pub fn edit_text(text: &mut String, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            text.clear();
            true
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            text.push(c);
            true
        }
        KeyCode::Backspace => {
            text.pop();
            true
        }
        _ => false,
    }
}
