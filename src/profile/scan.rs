//! Naive tag and link extraction.
//!
//! Pages are scanned with two patterns rather than parsed: every `<...>`
//! substring is a tag, and a tag yields a link when its leading token is
//! followed somewhere by an `http`/`https` URL that ends at a quote. Nested
//! quotes, entities and unquoted attributes are not understood.

use std::sync::LazyLock;

use regex::Regex;

fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex_unsafe(r"<(.*?)>", "TAG_RE"));

// Whole-tag match: leading token, anything, then a quoted absolute URL
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r#"^(\s*?\S+?\s+?).*?((?:http|https)://.+?)["'].*?$"#,
        "LINK_RE",
    )
});

/// How a discovered link is treated by the profiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `<a ...>`: counted, never fetched
    Anchor,
    /// Anything else: fetched to measure its size
    Embedded,
}

/// One link found inside a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLink {
    pub kind: LinkKind,
    pub url: String,
}

/// Extracts links from every tag of `page`, in document order.
pub fn scan_links(page: &str) -> Vec<TagLink> {
    TAG_RE
        .captures_iter(page)
        .filter_map(|tag| tag.get(1))
        .filter_map(|inner| link_in_tag(inner.as_str()))
        .collect()
}

fn link_in_tag(tag: &str) -> Option<TagLink> {
    let caps = LINK_RE.captures(tag)?;
    let leading = caps.get(1)?.as_str().trim().to_lowercase();
    let url = caps.get(2)?.as_str().to_string();
    let kind = if leading == "a" {
        LinkKind::Anchor
    } else {
        LinkKind::Embedded
    };
    Some(TagLink { kind, url })
}
