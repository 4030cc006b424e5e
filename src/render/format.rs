//! Display formatting shared by the text and terminal renderers.

use chrono::{DateTime, Utc};
use diagchart_types::Tick;

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: f64) -> String {
    let magnitude = n.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{:.2}", n)
    }
}

/// Format a byte count with binary units (e.g., 1536 -> "1.5 KiB").
pub fn format_size(bytes: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes;
    let mut unit = 0;
    while value.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", value as i64, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Format an x axis position: timestamps as UTC `HH:MM:SS`, labels as-is.
pub fn format_tick(tick: &Tick) -> String {
    match tick {
        Tick::Millis(ms) => format_millis(*ms),
        Tick::Label(label) => label.clone(),
    }
}

pub(crate) fn format_millis(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}
