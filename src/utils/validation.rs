//! Input validation primitives.
//!
//! Replaces verbose `ok_or_else` + `Error::validation_*` chains at argument
//! boundaries.

use crate::error::{Error, Result};
use crate::tags::{self, TagDescriptor, SEPARATOR};

/// Require a string to be non-empty after trimming.
///
/// Returns a reference to the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None, None))
    } else {
        Ok(trimmed)
    }
}

/// Require a user-supplied tag name a document could actually carry.
///
/// Accepts the name with or without a leading marker. Rejects empty names,
/// names holding whitespace or commas, and names with empty path segments.
pub fn require_tag(value: &str, field: &str) -> Result<TagDescriptor> {
    let trimmed = require_non_empty(value, field, "Tag name cannot be empty")
        .map_err(|_| Error::validation_invalid_tag(field, value, "empty"))?;

    let name = tags::canonical_name(trimmed);
    if name.is_empty() {
        return Err(Error::validation_invalid_tag(field, value, "empty"));
    }
    if name.chars().any(|c| c == ',' || c.is_whitespace()) {
        return Err(Error::validation_invalid_tag(
            field,
            value,
            "contains whitespace or a comma",
        ));
    }
    if name.split(SEPARATOR).any(str::is_empty) {
        return Err(Error::validation_invalid_tag(
            field,
            value,
            "contains an empty path segment",
        ));
    }

    Ok(TagDescriptor::new(trimmed))
}
