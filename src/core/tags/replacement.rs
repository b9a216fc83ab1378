use serde::Serialize;
use serde_yml::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::{canonical_name, has_marker, to_tag, TagDescriptor, MARKER, SEPARATOR};

/// First pair of tags in a document that a rename would fold into one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeCheck {
    /// The existing tag that would be renamed.
    pub original: TagDescriptor,
    /// What it would become; this tag already exists in the document.
    pub would_be: TagDescriptor,
}

/// A source → target rename, applied to strings and front-matter values.
///
/// Owns a memo of values it has already rewritten, keyed by canonical name.
/// The memo only ever holds consequences of `(source, target)` and lives as
/// long as one rename operation.
#[derive(Debug)]
pub struct TagReplacement {
    source: TagDescriptor,
    target: TagDescriptor,
    known: RefCell<HashMap<String, String>>,
}

/// Key under which rewritten values are memoized.
fn to_canonical_key(value: &str) -> String {
    canonical_name(value)
}

fn is_segment_break(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

/// Split `value` into alternating token / separator segments, starting with a
/// (possibly empty) token.
fn split_segments(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_separator = false;

    for (idx, c) in value.char_indices() {
        if is_segment_break(c) != in_separator {
            segments.push(&value[start..idx]);
            start = idx;
            in_separator = !in_separator;
        }
    }
    segments.push(&value[start..]);
    segments
}

/// A single tag value cut into the parts a rewrite keeps verbatim around the
/// name: leading whitespace, the marker run, and trailing separators or
/// whitespace.
struct ValueParts<'v> {
    lead: &'v str,
    markers: &'v str,
    name: &'v str,
    trail: &'v str,
}

impl<'v> ValueParts<'v> {
    fn of(value: &'v str) -> Self {
        let name_start = value.len() - value.trim_start().len();
        let after_lead = &value[name_start..];
        let marker_end = name_start + (after_lead.len() - after_lead.trim_start_matches(MARKER).len());
        let name_end = value
            .trim_end_matches(|c: char| c == SEPARATOR || c.is_whitespace())
            .len()
            .max(marker_end);

        Self {
            lead: &value[..name_start],
            markers: &value[name_start..marker_end],
            name: &value[marker_end..name_end],
            trail: &value[name_end..],
        }
    }
}

impl TagReplacement {
    pub fn new(source: TagDescriptor, target: TagDescriptor) -> Self {
        let mut known = HashMap::new();
        known.insert(
            to_canonical_key(source.name()),
            target.name().to_string(),
        );

        Self {
            source,
            target,
            known: RefCell::new(known),
        }
    }

    pub fn source(&self) -> &TagDescriptor {
        &self.source
    }

    pub fn target(&self) -> &TagDescriptor {
        &self.target
    }

    /// Source and target are the same tag; nothing can change.
    pub fn is_noop(&self) -> bool {
        self.source.same_tag(&self.target)
    }

    /// Replace the source tag's span starting at byte `position` with the
    /// target's display form. The caller has already checked that the span
    /// holds the source tag; an out-of-range span leaves `text` as is.
    pub fn in_string(&self, text: &str, position: usize) -> String {
        let end = position + self.source.tag().len();
        match (text.get(..position), text.get(end..)) {
            (Some(head), Some(tail)) => format!("{}{}{}", head, self.target.tag(), tail),
            _ => text.to_string(),
        }
    }

    /// Rewrite every matching entry of a front-matter sequence.
    ///
    /// Non-string and empty entries pass through. With `skip_odd_entries`,
    /// entries at odd indices are separators and pass through too. Alias
    /// entries are only candidates when written with a marker. Any other entry
    /// holding commas or whitespace is split into pieces and each piece is
    /// rewritten on its own.
    pub fn in_array(&self, values: &[Value], skip_odd_entries: bool, is_alias: bool) -> Vec<Value> {
        values
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                if skip_odd_entries && idx % 2 == 1 {
                    return value.clone();
                }
                match value {
                    Value::String(entry) => Value::String(self.in_entry(entry, is_alias)),
                    other => other.clone(),
                }
            })
            .collect()
    }

    fn in_entry(&self, entry: &str, is_alias: bool) -> String {
        if entry.is_empty() {
            return String::new();
        }

        if is_alias {
            if !has_marker(entry) {
                return entry.to_string();
            }
        } else if entry.chars().any(is_segment_break) {
            let pieces: Vec<Value> = split_segments(entry)
                .into_iter()
                .map(|piece| Value::String(piece.to_string()))
                .collect();
            return self
                .in_array(&pieces, true, false)
                .iter()
                .filter_map(Value::as_str)
                .collect();
        }

        self.replace_value(entry)
            .unwrap_or_else(|| entry.to_string())
    }

    /// Rewritten form of a single tag value. Only the name changes; the
    /// surrounding whitespace, marker and trailing separators are kept as
    /// written. `None` when the value is not the source tag or a descendant.
    fn replace_value(&self, value: &str) -> Option<String> {
        let parts = ValueParts::of(value);
        let key = to_canonical_key(parts.name);
        let cached = self.known.borrow().get(&key).cloned();

        let name = match cached {
            Some(name) => name,
            None => {
                if !self.source.matches(parts.name) {
                    return None;
                }
                let rewritten = self.in_string(&format!("{}{}", MARKER, parts.name), 0);
                let name = rewritten[MARKER.len_utf8()..].to_string();
                self.known.borrow_mut().insert(key, name.clone());
                name
            }
        };

        Some(format!("{}{}{}{}", parts.lead, parts.markers, name, parts.trail))
    }

    /// Whether renaming would fold two of `existing` tag names into one.
    ///
    /// Returns the first existing tag whose renamed form is already present
    /// (case-insensitively), paired with that renamed form.
    pub fn will_merge_tags(&self, existing: &[String]) -> Option<MergeCheck> {
        if self.is_noop() {
            return None;
        }

        let present: HashSet<String> = existing.iter().map(|name| canonical_name(name)).collect();

        existing
            .iter()
            .filter(|name| self.source.matches(name))
            .find_map(|name| {
                let renamed = self.in_string(&to_tag(name), 0);
                if present.contains(&canonical_name(&renamed)) {
                    Some(MergeCheck {
                        original: TagDescriptor::new(name),
                        would_be: TagDescriptor::new(&renamed),
                    })
                } else {
                    None
                }
            })
    }
}
