//! YAML front-matter: locating the block, parsing it, and the shapes a tag
//! field can take.

use serde_yml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::tags;

const DELIMITER: &str = "---";

/// Which front-matter fields carry tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `tags` / `tag`
    Tags,
    /// `aliases` / `alias`
    Aliases,
}

impl FieldKind {
    pub fn of_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "tags" | "tag" => Some(FieldKind::Tags),
            "aliases" | "alias" => Some(FieldKind::Aliases),
            _ => None,
        }
    }

    pub fn is_alias(self) -> bool {
        self == FieldKind::Aliases
    }
}

/// A front-matter field as the rename rules see it.
///
/// Numbers, booleans and nested mappings read as `Missing`: there is nothing
/// in them to rename.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Missing,
    Scalar(String),
    Sequence(Vec<Value>),
}

impl FieldValue {
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => FieldValue::Scalar(s.clone()),
            Some(Value::Sequence(items)) => FieldValue::Sequence(items.clone()),
            _ => FieldValue::Missing,
        }
    }

    /// The field as a sequence of entries.
    pub fn entries(&self) -> Vec<Value> {
        match self {
            FieldValue::Missing => Vec::new(),
            FieldValue::Scalar(s) => vec![Value::String(s.clone())],
            FieldValue::Sequence(items) => items.clone(),
        }
    }

    /// Rebuild a field of this shape from rewritten entries.
    pub fn with_entries(&self, entries: Vec<Value>) -> Self {
        match self {
            FieldValue::Missing => FieldValue::Missing,
            FieldValue::Scalar(original) => match entries.into_iter().next() {
                Some(Value::String(s)) => FieldValue::Scalar(s),
                _ => FieldValue::Scalar(original.clone()),
            },
            FieldValue::Sequence(_) => FieldValue::Sequence(entries),
        }
    }

    pub fn into_yaml(self) -> Option<Value> {
        match self {
            FieldValue::Missing => None,
            FieldValue::Scalar(s) => Some(Value::String(s)),
            FieldValue::Sequence(items) => Some(Value::Sequence(items)),
        }
    }

    /// Tag candidates in the field. Tag fields may pack several tags into one
    /// comma/whitespace-delimited string; alias entries count only when
    /// written with a marker.
    pub fn tag_tokens(&self, kind: FieldKind) -> Vec<String> {
        let entries = self.entries();
        let strings = entries.iter().filter_map(Value::as_str);

        match kind {
            FieldKind::Tags => strings
                .flat_map(|s| s.split(|c: char| c == ',' || c.is_whitespace()))
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
            FieldKind::Aliases => strings
                .filter(|s| tags::has_marker(s))
                .map(str::to_string)
                .collect(),
        }
    }
}

/// A document split around its front-matter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    /// YAML between the delimiters, if the document opens with a block.
    pub yaml: Option<&'a str>,
    pub body: &'a str,
    /// Byte offset of `body` within the document.
    pub body_offset: usize,
}

/// Locate a leading `---` ... `---` block.
pub fn split(content: &str) -> Sections<'_> {
    let no_block = Sections {
        yaml: None,
        body: content,
        body_offset: 0,
    };

    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return no_block;
    };
    if first.trim_end() != DELIMITER {
        return no_block;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let body_offset = offset + line.len();
            return Sections {
                yaml: Some(&content[yaml_start..offset]),
                body: &content[body_offset..],
                body_offset,
            };
        }
        offset += line.len();
    }

    no_block
}

/// Parse a front-matter block into a mapping. An empty block is an empty
/// mapping; anything that is not a mapping is an error.
pub fn parse(yaml: &str) -> std::result::Result<Mapping, String> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }

    match serde_yml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => Ok(mapping),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err("front-matter is not a key/value mapping".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Reassemble a document from a mapping and body. An empty mapping drops the
/// block entirely.
pub fn render(mapping: &Mapping, body: &str) -> Result<String> {
    if mapping.is_empty() {
        return Ok(body.to_string());
    }

    let yaml = serde_yml::to_string(mapping)
        .map_err(|e| Error::internal_yaml(e.to_string(), Some("serialize front-matter".to_string())))?;

    Ok(format!("{}\n{}{}\n{}", DELIMITER, yaml, DELIMITER, body))
}
