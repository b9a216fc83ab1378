//! Corpus scan: which documents a rename touches, and where.

use crate::corpus::{Corpus, FieldKind, InlineTag, TagIndex};
use crate::error::Result;
use crate::tags::TagDescriptor;

use super::unit::RenameUnit;

/// A document the rename touches, with every tag name it currently carries.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub unit: RenameUnit,
    pub existing_tags: Vec<String>,
}

/// Documents that may carry `source`: the index's answer when there is one,
/// every document otherwise.
fn candidate_paths(
    corpus: &dyn Corpus,
    source: &TagDescriptor,
    index: Option<&dyn TagIndex>,
) -> Result<Vec<String>> {
    match index {
        Some(index) => Ok(index
            .documents_with_tag(source.canonical_name())
            .into_iter()
            .collect()),
        None => corpus.documents(),
    }
}

fn frontmatter_mentions(
    metadata: &crate::corpus::DocumentMetadata,
    source: &TagDescriptor,
) -> bool {
    [FieldKind::Tags, FieldKind::Aliases].into_iter().any(|kind| {
        metadata.fields(kind).iter().any(|field| {
            field
                .tag_tokens(kind)
                .iter()
                .any(|token| source.matches(token))
        })
    })
}

/// Build one [`Candidate`] per markdown document that mentions `source`
/// inline or in its tag/alias front-matter.
///
/// Documents that vanished, are not markdown, or have no retrievable
/// metadata are skipped. Inline occurrences come out highest offset first.
pub fn collect_rename_files(
    corpus: &dyn Corpus,
    source: &TagDescriptor,
    index: Option<&dyn TagIndex>,
) -> Result<Vec<Candidate>> {
    let paths = candidate_paths(corpus, source, index)?;
    let inspected = paths.len();
    let mut candidates = Vec::new();

    for path in paths {
        let Some(doc) = corpus.resolve(&path) else {
            continue;
        };
        if !doc.is_markdown() {
            continue;
        }
        let Some(metadata) = corpus.metadata(&path) else {
            continue;
        };

        let occurrences: Vec<InlineTag> = metadata
            .tags
            .iter()
            .filter(|t| source.matches(&t.tag))
            .rev()
            .cloned()
            .collect();
        let has_frontmatter_match = frontmatter_mentions(&metadata, source);

        if occurrences.is_empty() && !has_frontmatter_match {
            continue;
        }

        candidates.push(Candidate {
            existing_tags: metadata.tag_names(),
            unit: RenameUnit::new(path, occurrences, has_frontmatter_match),
        });
    }

    log_status!(
        "scan",
        "{} of {} documents mention {}",
        candidates.len(),
        inspected,
        source
    );
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::corpus::{DiskCorpus, MetadataIndex};
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn corpus_with(files: &[(&str, &str)]) -> (tempfile::TempDir, DiskCorpus) {
        let dir = tempdir().unwrap();
        for (path, content) in files {
            std::fs::write(dir.path().join(path), content).unwrap();
        }
        let corpus = DiskCorpus::open(dir.path(), Settings::default()).unwrap();
        (dir, corpus)
    }

    fn paths(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.unit.path()).collect()
    }

    #[test]
    fn finds_inline_and_frontmatter_mentions() {
        let (_dir, corpus) = corpus_with(&[
            ("a.md", "x #Projects y #projects/client"),
            ("b.md", "---\ntags: projects\n---\nno inline\n"),
            ("c.md", "---\naliases: ['#Projects']\n---\n"),
            ("d.md", "#ProjectsArchive #inbox"),
            ("e.txt", "#Projects"),
        ]);
        let source = TagDescriptor::new("Projects");

        let found = collect_rename_files(&corpus, &source, None).unwrap();
        assert_eq!(paths(&found), vec!["a.md", "b.md", "c.md"]);

        let a = &found[0].unit;
        assert_eq!(a.occurrences().len(), 2);
        assert!(a.occurrences()[0].start > a.occurrences()[1].start);
        assert!(!a.has_frontmatter_match());
        assert!(found[1].unit.has_frontmatter_match());
        assert!(found[1].unit.occurrences().is_empty());
        assert!(found[2].unit.has_frontmatter_match());
    }

    #[test]
    fn plain_alias_is_not_a_mention() {
        let (_dir, corpus) = corpus_with(&[("a.md", "---\naliases: [Projects]\n---\n")]);
        let found = collect_rename_files(&corpus, &TagDescriptor::new("Projects"), None).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn index_narrows_the_candidates() {
        struct OnlyB;
        impl TagIndex for OnlyB {
            fn documents_with_tag(&self, _canonical_name: &str) -> BTreeSet<String> {
                BTreeSet::from(["b.md".to_string(), "missing.md".to_string()])
            }
        }

        let (_dir, corpus) = corpus_with(&[("a.md", "#Projects"), ("b.md", "#Projects")]);
        let found =
            collect_rename_files(&corpus, &TagDescriptor::new("Projects"), Some(&OnlyB)).unwrap();
        assert_eq!(paths(&found), vec!["b.md"]);
    }

    #[test]
    fn metadata_index_agrees_with_full_scan() {
        let (_dir, corpus) = corpus_with(&[
            ("a.md", "#Projects/x"),
            ("b.md", "---\ntags: [projects]\n---\n"),
            ("c.md", "#inbox"),
        ]);
        let source = TagDescriptor::new("projects");
        let index = MetadataIndex::build(&corpus).unwrap();

        let full = collect_rename_files(&corpus, &source, None).unwrap();
        let indexed = collect_rename_files(&corpus, &source, Some(&index)).unwrap();
        assert_eq!(paths(&full), paths(&indexed));
    }

    #[test]
    fn existing_tags_cover_body_and_frontmatter() {
        let (_dir, corpus) = corpus_with(&[("a.md", "---\ntags: [areas]\n---\n#Projects\n")]);
        let found = collect_rename_files(&corpus, &TagDescriptor::new("Projects"), None).unwrap();
        assert_eq!(found[0].existing_tags, vec!["#Projects", "#areas"]);
    }
}
