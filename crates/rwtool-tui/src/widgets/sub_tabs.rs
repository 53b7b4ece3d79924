//! Horizontal filter bar, e.g. `All  [Pending]  Approved  Rejected`.

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use rwtool_core::StatusFilter;

use crate::theme;

/// Render labels inline with the active one bracketed and highlighted.
pub fn render_sub_tabs<'a>(labels: &[&'a str], active_index: usize) -> Line<'a> {
    let mut spans = Vec::with_capacity(labels.len() * 2);

    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", theme::key_hint()));
        }
        if i == active_index {
            spans.push(Span::styled(
                format!("[{label}]"),
                theme::tab_active().add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(*label, theme::tab_inactive()));
        }
    }

    Line::from(spans)
}

/// Filter bar for a status filter over `choices`, with `All` first.
pub fn status_tabs(choices: &[&'static str], status: &StatusFilter) -> Line<'static> {
    let mut labels = vec!["All"];
    labels.extend_from_slice(choices);
    let active = match status {
        StatusFilter::All => 0,
        StatusFilter::Only(wanted) => choices
            .iter()
            .position(|c| c.eq_ignore_ascii_case(wanted))
            .map_or(0, |i| i + 1),
    };
    render_sub_tabs(&labels, active)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn active_choice_is_bracketed() {
        let line = status_tabs(&["Pending", "Approved"], &StatusFilter::Only("pending".into()));
        assert_eq!(text(&line), "All  [Pending]  Approved");
    }

    #[test]
    fn all_is_first() {
        let line = status_tabs(&["Pending"], &StatusFilter::All);
        assert_eq!(text(&line), "[All]  Pending");
    }
}
