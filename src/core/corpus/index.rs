use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::{Corpus, TagIndex};
use crate::error::Result;
use crate::tags;

/// Tag → documents lookup built from corpus metadata.
///
/// Every tag is filed under itself and each of its ancestors, so a lookup
/// for `projects` also returns documents tagged `projects/client`. Alias
/// entries written as tags are filed separately: lookups see them, tag
/// counts do not.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    by_tag: BTreeMap<String, BTreeSet<String>>,
    by_alias: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub documents: usize,
}

impl MetadataIndex {
    pub fn build(corpus: &dyn Corpus) -> Result<Self> {
        let mut index = Self::default();

        for path in corpus.documents()? {
            let Some(doc) = corpus.resolve(&path) else {
                continue;
            };
            if !doc.is_markdown() {
                continue;
            }
            let Some(metadata) = corpus.metadata(&path) else {
                continue;
            };
            for name in metadata.tag_names() {
                file_under(&mut index.by_tag, &name, &path);
            }
            for name in metadata.alias_tags() {
                file_under(&mut index.by_alias, &name, &path);
            }
        }

        log_status!("scan", "Indexed {} tags", index.by_tag.len());
        Ok(index)
    }

    /// Document counts per canonical tag, optionally limited to one subtree.
    pub fn tag_counts(&self, under: Option<&str>) -> Vec<TagCount> {
        let filter = under.map(tags::TagDescriptor::new);

        self.by_tag
            .iter()
            .filter(|(tag, _)| filter.as_ref().map_or(true, |f| f.matches(tag)))
            .map(|(tag, docs)| TagCount {
                tag: format!("{}{}", tags::MARKER, tag),
                documents: docs.len(),
            })
            .collect()
    }
}

fn file_under(map: &mut BTreeMap<String, BTreeSet<String>>, tag: &str, path: &str) {
    for canonical in tags::canonical_lineage(tag) {
        map.entry(canonical).or_default().insert(path.to_string());
    }
}

impl TagIndex for MetadataIndex {
    fn documents_with_tag(&self, canonical_name: &str) -> BTreeSet<String> {
        let key = tags::canonical_name(canonical_name);
        [&self.by_tag, &self.by_alias]
            .into_iter()
            .filter_map(|map| map.get(&key))
            .flatten()
            .cloned()
            .collect()
    }
}
