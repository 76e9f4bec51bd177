//! Terminal display helpers for the table output.

use std::io::{self, IsTerminal};
use unicode_width::UnicodeWidthChar;

/// Check if stdout is a terminal.
#[inline]
pub fn is_terminal() -> bool {
    io::stdout().is_terminal()
}

const ELLIPSIS: &str = "...";

/// Truncate text to fit within `max_width` display columns.
///
/// Wide characters count for their display width. An ellipsis is appended
/// when anything was cut.
///
/// # Examples
///
/// ```
/// use pubmed_fetcher::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    let width = |c: char| c.width().unwrap_or(1);
    if text.chars().map(width).sum::<usize>() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width.saturating_sub(ELLIPSIS.len());
    let mut used = 0;
    let mut kept: String = text
        .chars()
        .take_while(|&c| {
            used += width(c);
            used <= budget
        })
        .collect();
    kept.push_str(ELLIPSIS);
    kept
}
