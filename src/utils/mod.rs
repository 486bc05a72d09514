//! Utility functions

use std::time::Duration;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format duration for display
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60000 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        let secs = d.as_secs();
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}m {}s", mins, remaining_secs)
    }
}

/// Truncate to a display width, marking the cut with an ellipsis
pub fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut result = String::new();

    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        result.push(c);
    }

    result.push_str("...");
    result
}

/// Flatten a value onto one line: newlines become `↵`, other control
/// characters become spaces
pub fn single_line(s: &str) -> String {
    s.replace("\r\n", "\n")
        .chars()
        .map(|c| match c {
            '\n' | '\r' => '↵',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

/// Left-align `s` in a field `width` columns wide
pub fn pad(s: &str, width: usize) -> String {
    let mut result = s.to_string();
    result.extend(std::iter::repeat(' ').take(width.saturating_sub(s.width())));
    result
}

/// Format number with thousand separators
pub fn format_number(n: i64) -> String {
    let s = n.abs().to_string();
    let mut result = String::new();

    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }

    if n < 0 {
        result.insert(0, '-');
    }

    result
}
