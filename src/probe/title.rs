//! Page title extraction.

use std::sync::LazyLock;

use regex::Regex;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<title>(.*?)</title>").unwrap_or_else(|e| {
        panic!("Failed to compile title pattern: {}. This is a programming error.", e)
    })
});

/// Returns the text of the first `<title>...</title>`, matched case-insensitively.
///
/// The match is literal: attributes on the title tag or a title split across
/// lines do not match. Call [`join_lines`] first to fold multi-line pages.
pub fn extract_title(page: &str) -> Option<&str> {
    TITLE_RE
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Concatenates the lines of a page, dropping line terminators.
///
/// Captured pages are stored in this form so that tags broken across lines
/// are still seen by the line-oriented title and tag patterns.
pub fn join_lines(raw: &str) -> String {
    raw.lines().collect()
}
