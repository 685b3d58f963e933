//! Small helpers for text budgets, logging previews and edition naming.

use chrono::{DateTime, Local, NaiveTime, Timelike};

/// Classify a wall-clock time into morning, afternoon, or evening.
///
/// - **Morning**: 00:00 - 08:00
/// - **Afternoon**: 08:00 - 16:00
/// - **Evening**: 16:00 - 24:00
pub fn time_of_day(at: NaiveTime) -> &'static str {
    match at.hour() {
        0..8 => "morning",
        8..16 => "afternoon",
        _ => "evening",
    }
}

/// Edition stamp used for archive file names, e.g. `2025-05-06_evening`.
pub fn edition_stamp(at: &DateTime<Local>) -> String {
    format!("{}_{}", at.date_naive(), time_of_day(at.time()))
}

/// Keep at most `max` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped bytes appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let kept = truncate_chars(s, max);
    if kept.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", kept, s.len() - kept.len())
    }
}

/// Whitespace-separated word count.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
