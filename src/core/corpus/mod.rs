//! The document corpus the rename engine works over.
//!
//! The engine never touches files directly. It goes through [`Corpus`] for
//! document content and cached metadata, and optionally through [`TagIndex`]
//! to narrow the set of documents it has to look at. [`DiskCorpus`] and
//! [`MetadataIndex`] are the implementations the CLI uses.

mod disk;
pub mod frontmatter;
mod index;

use serde::Serialize;
use serde_yml::Mapping;
use std::collections::BTreeSet;

use crate::error::Result;
use crate::tags;

pub use disk::DiskCorpus;
pub use frontmatter::{FieldKind, FieldValue};
pub use index::{MetadataIndex, TagCount};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Markdown-like text with a body that can carry inline tags.
    Markdown,
    Other,
}

/// A resolved document handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub kind: DocumentKind,
}

impl Document {
    pub fn is_markdown(&self) -> bool {
        self.kind == DocumentKind::Markdown
    }
}

/// An inline tag as the metadata cache saw it: text plus byte range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineTag {
    pub tag: String,
    pub start: usize,
    pub end: usize,
}

/// Cached, already-parsed metadata of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    /// Inline tags in document order.
    pub tags: Vec<InlineTag>,
    pub frontmatter: Option<Mapping>,
}

impl DocumentMetadata {
    /// Front-matter fields of the given kind, in declaration order.
    pub fn fields(&self, kind: FieldKind) -> Vec<FieldValue> {
        let Some(frontmatter) = &self.frontmatter else {
            return Vec::new();
        };

        frontmatter
            .iter()
            .filter(|(key, _)| key.as_str().and_then(FieldKind::of_key) == Some(kind))
            .map(|(_, value)| FieldValue::of(Some(value)))
            .collect()
    }

    /// Every tag name this document carries, inline and in front-matter,
    /// each written with a marker.
    pub fn tag_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tags.iter().map(|t| tags::to_tag(&t.tag)).collect();

        for field in self.fields(FieldKind::Tags) {
            names.extend(
                field
                    .tag_tokens(FieldKind::Tags)
                    .iter()
                    .map(|token| tags::to_tag(token)),
            );
        }

        names
    }

    /// Alias entries written as tags, each with a marker. These are not tags
    /// the document carries, but a rename still rewrites them.
    pub fn alias_tags(&self) -> Vec<String> {
        self.fields(FieldKind::Aliases)
            .iter()
            .flat_map(|field| field.tag_tokens(FieldKind::Aliases))
            .map(|token| tags::to_tag(&token))
            .collect()
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// Read/write access to documents and their cached metadata.
pub trait Corpus {
    /// Every document path in the corpus.
    fn documents(&self) -> Result<Vec<String>>;

    /// Resolve a path to a live document, or `None` when it no longer exists.
    fn resolve(&self, path: &str) -> Option<Document>;

    fn read_text(&self, doc: &Document) -> Result<String>;

    fn write_text(&self, doc: &Document, text: &str) -> Result<()>;

    /// Metadata for `path`, or `None` when nothing can be retrieved.
    fn metadata(&self, path: &str) -> Option<DocumentMetadata>;

    /// Structured read-modify-write of the document's front-matter block.
    fn process_frontmatter(
        &self,
        doc: &Document,
        mutator: &mut dyn FnMut(&mut Mapping),
    ) -> Result<()>;
}

/// Fast "which documents carry this tag" lookups.
pub trait TagIndex {
    /// Documents carrying the tag with this canonical name or any descendant.
    fn documents_with_tag(&self, canonical_name: &str) -> BTreeSet<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(yaml: &str) -> DocumentMetadata {
        DocumentMetadata {
            tags: vec![InlineTag {
                tag: "#Inline/Tag".to_string(),
                start: 0,
                end: 11,
            }],
            frontmatter: frontmatter::parse(yaml).ok(),
        }
    }

    #[test]
    fn fields_match_keys_case_insensitively() {
        let meta = metadata("Tags: [a]\ntag: b\naliases: [c]\ntitle: d\n");
        assert_eq!(meta.fields(FieldKind::Tags).len(), 2);
        assert_eq!(meta.fields(FieldKind::Aliases).len(), 1);
    }

    #[test]
    fn tag_names_cover_inline_and_frontmatter() {
        let meta = metadata("tags: \"todo, projects/x\"\n");
        assert_eq!(
            meta.tag_names(),
            vec!["#Inline/Tag", "#todo", "#projects/x"]
        );
    }

    #[test]
    fn alias_tags_are_kept_apart_from_tag_names() {
        let meta = metadata("aliases: [Plain, '#Projects/x']\n");
        assert_eq!(meta.alias_tags(), vec!["#Projects/x"]);
        assert_eq!(meta.tag_names(), vec!["#Inline/Tag"]);
    }

    #[test]
    fn no_frontmatter_means_no_fields() {
        let meta = DocumentMetadata::default();
        assert!(meta.fields(FieldKind::Tags).is_empty());
        assert!(meta.tag_names().is_empty());
    }
}
