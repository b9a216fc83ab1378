//! Hierarchical tag names: canonical forms, matching, and rewriting.
//!
//! A tag is a `/`-separated path written with a leading `#` marker
//! (`#projects/client`). Comparisons are case-insensitive and always go
//! through [`canonical_name`], which the corpus index uses too, so the
//! engine and the index agree on what "the same tag" means.

mod descriptor;
mod replacement;

use regex::Regex;
use std::sync::OnceLock;

pub use descriptor::TagDescriptor;
pub use replacement::{MergeCheck, TagReplacement};

/// Leading marker of a tag.
pub const MARKER: char = '#';

/// Separator between tag path segments.
pub const SEPARATOR: char = '/';

/// Characters a tag may contain: anything but whitespace and ASCII
/// punctuation other than `-`, `/` and `_`.
pub(crate) const TAG_CHAR_CLASS: &str = r"[^\s!-,.:-@\[-\^`{-~]";

fn tag_char_start() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!("^{}", TAG_CHAR_CLASS)).expect("tag character class compiles")
    })
}

/// Whether `rest` opens with a tag character, i.e. text directly after a tag
/// would extend it.
pub fn continues_tag(rest: &str) -> bool {
    tag_char_start().is_match(rest)
}

/// Display form of a raw tag name: trimmed, exactly one leading marker,
/// no trailing separators.
pub fn to_tag(raw: &str) -> String {
    let name = raw
        .trim()
        .trim_start_matches(MARKER)
        .trim_end_matches(SEPARATOR);
    format!("{}{}", MARKER, name)
}

/// Marker-less, lowercased path used for every equality and hierarchy test.
pub fn canonical_name(raw: &str) -> String {
    to_tag(raw)[MARKER.len_utf8()..].to_lowercase()
}

/// Whether `value` is written with a leading marker.
pub fn has_marker(value: &str) -> bool {
    value.trim_start().starts_with(MARKER)
}

/// `tag` followed by each ancestor, canonically: `a/b/c` → `a/b/c`, `a/b`, `a`.
pub fn canonical_lineage(raw: &str) -> Vec<String> {
    let canonical = canonical_name(raw);
    let mut lineage = Vec::new();
    let mut current = canonical.as_str();
    while !current.is_empty() {
        lineage.push(current.to_string());
        current = match current.rfind(SEPARATOR) {
            Some(pos) => &current[..pos],
            None => "",
        };
    }
    lineage
}
