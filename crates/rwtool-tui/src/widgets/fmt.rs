//! Cell formatting.

use bytesize::ByteSize;
use chrono::NaiveDateTime;

pub const DASH: &str = "─";

pub fn date(value: Option<NaiveDateTime>) -> String {
    value.map_or_else(|| DASH.into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

pub fn size(bytes: Option<u64>) -> String {
    bytes.map_or_else(|| DASH.into(), |b| ByteSize::b(b).to_string())
}

pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { DASH } else { value }
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
pub fn clip(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_owned();
    }
    let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
