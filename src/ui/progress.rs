//! Progress formatting helpers.

use std::time::Duration;

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        format!("{}m {:02}s", mins as u64, (secs - mins * 60.0) as u64)
    }
}

/// Step counter like `[2/4]` from a zero-based index.
pub fn format_counter(index: usize, total: usize) -> String {
    format!("[{}/{}]", index + 1, total)
}
