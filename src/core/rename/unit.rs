use serde::Serialize;
use serde_yml::Mapping;

use crate::corpus::{Corpus, FieldKind, FieldValue, InlineTag};
use crate::error::Result;
use crate::notice::Notifier;
use crate::tags::{self, TagDescriptor, TagReplacement, SEPARATOR};

// ============================================================================
// Types
// ============================================================================

/// One document's share of a rename, captured at scan time.
///
/// Occurrences are held highest offset first. Rewriting in that order only
/// ever changes text after the occurrences still to come, so their offsets
/// stay valid. A unit is applied once; after that its offsets are stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameUnit {
    path: String,
    occurrences: Vec<InlineTag>,
    has_frontmatter_match: bool,
}

/// Whether captured occurrences still describe the current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Stale {
        start: usize,
        expected: String,
        found: Option<String>,
    },
}

/// What applying a unit did to its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitOutcome {
    Changed,
    /// Nothing to change, or the document is gone.
    Unchanged,
    /// The document was edited since the scan; left untouched.
    Stale,
}

// ============================================================================
// Unit
// ============================================================================

impl RenameUnit {
    pub fn new(path: impl Into<String>, mut occurrences: Vec<InlineTag>, has_frontmatter_match: bool) -> Self {
        occurrences.sort_by(|a, b| b.start.cmp(&a.start));
        Self {
            path: path.into(),
            occurrences,
            has_frontmatter_match,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Inline occurrences, highest start offset first.
    pub fn occurrences(&self) -> &[InlineTag] {
        &self.occurrences
    }

    pub fn has_frontmatter_match(&self) -> bool {
        self.has_frontmatter_match
    }

    /// Check every captured occurrence against `text`.
    ///
    /// An occurrence is still good when both the tag text captured at scan
    /// time and the text now at its range name `source` (or a descendant),
    /// the range opens with exactly the source tag's span, and the tag still
    /// ends where the range does. Trailing separators were never part of a
    /// captured tag, so they may follow it.
    pub fn validate(&self, text: &str, source: &TagDescriptor) -> Validation {
        for occurrence in &self.occurrences {
            let found = text.get(occurrence.start..occurrence.end);
            let span_ok = found
                .and_then(|f| f.get(..source.tag().len()))
                .is_some_and(|span| span.to_lowercase() == source.canonical());
            let ends_here = text
                .get(occurrence.end..)
                .is_some_and(|rest| !tags::continues_tag(rest.trim_start_matches(SEPARATOR)));

            let still_matches = span_ok
                && ends_here
                && source.matches(&occurrence.tag)
                && found.is_some_and(|f| source.matches(f));

            if !still_matches {
                return Validation::Stale {
                    start: occurrence.start,
                    expected: occurrence.tag.clone(),
                    found: found.map(str::to_string),
                };
            }
        }
        Validation::Valid
    }

    /// Rewrite this document: inline occurrences first, then front-matter.
    ///
    /// A stale document is left entirely untouched and reported as
    /// [`UnitOutcome::Stale`] after a user notice. Read/write failures are
    /// returned as errors.
    pub fn apply(
        &self,
        corpus: &dyn Corpus,
        replacement: &TagReplacement,
        notifier: &dyn Notifier,
    ) -> Result<UnitOutcome> {
        let Some(doc) = corpus.resolve(&self.path) else {
            return Ok(UnitOutcome::Unchanged);
        };
        if !doc.is_markdown() {
            return Ok(UnitOutcome::Unchanged);
        }

        let original = corpus.read_text(&doc)?;

        if let Validation::Stale {
            start,
            expected,
            found,
        } = self.validate(&original, replacement.source())
        {
            notifier.notice(&format!("{} changed before rename; skipping", self.path));
            log_status!(
                "rename",
                "Stale occurrence in {} at byte {}: expected {}, found {}",
                self.path,
                start,
                expected,
                found.as_deref().unwrap_or("<out of range>")
            );
            return Ok(UnitOutcome::Stale);
        }

        let mut text = original.clone();
        for occurrence in &self.occurrences {
            text = replacement.in_string(&text, occurrence.start);
        }

        let mut changed = false;
        if text != original {
            corpus.write_text(&doc, &text)?;
            changed = true;
        }

        if self.has_frontmatter_match {
            let mut frontmatter_changed = false;
            corpus.process_frontmatter(&doc, &mut |frontmatter: &mut Mapping| {
                frontmatter_changed |= rewrite_frontmatter(frontmatter, replacement);
            })?;
            changed |= frontmatter_changed;
        }

        if changed {
            log_status!("rename", "Renamed {} in {}", replacement.source(), self.path);
            Ok(UnitOutcome::Changed)
        } else {
            Ok(UnitOutcome::Unchanged)
        }
    }

    /// [`apply`](Self::apply) reduced to "was the document changed".
    pub fn renamed(
        &self,
        corpus: &dyn Corpus,
        replacement: &TagReplacement,
        notifier: &dyn Notifier,
    ) -> Result<bool> {
        Ok(self.apply(corpus, replacement, notifier)? == UnitOutcome::Changed)
    }
}

/// Rewrite tag and alias fields in place. Only fields whose value actually
/// changes are replaced.
pub(crate) fn rewrite_frontmatter(frontmatter: &mut Mapping, replacement: &TagReplacement) -> bool {
    let mut changed = false;

    for (key, value) in frontmatter.iter_mut() {
        let Some(kind) = key.as_str().and_then(FieldKind::of_key) else {
            continue;
        };

        let field = FieldValue::of(Some(value));
        let rewritten =
            field.with_entries(replacement.in_array(&field.entries(), false, kind.is_alias()));
        if rewritten == field {
            continue;
        }
        if let Some(new_value) = rewritten.into_yaml() {
            *value = new_value;
            changed = true;
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::corpus::{frontmatter, DiskCorpus};
    use crate::notice::NoticeLog;
    use serde_yml::Value;
    use tempfile::tempdir;

    fn replacement(from: &str, to: &str) -> TagReplacement {
        TagReplacement::new(TagDescriptor::new(from), TagDescriptor::new(to))
    }

    fn occurrence(text: &str, tag: &str, from: usize) -> InlineTag {
        let start = from + text[from..].find(tag).unwrap();
        InlineTag {
            tag: tag.to_string(),
            start,
            end: start + tag.len(),
        }
    }

    #[test]
    fn new_orders_occurrences_back_to_front() {
        let text = "#a x #a/b y #a";
        let unit = RenameUnit::new(
            "n.md",
            vec![
                occurrence(text, "#a", 0),
                occurrence(text, "#a/b", 0),
                occurrence(text, "#a", 6),
            ],
            false,
        );
        let starts: Vec<usize> = unit.occurrences().iter().map(|o| o.start).collect();
        assert_eq!(starts, vec![12, 5, 0]);
    }

    #[test]
    fn back_to_front_keeps_offsets_valid() {
        // Source and target differ in length, so every rewrite shifts what follows.
        let text = "A #Projects then #Projects/Sub end";
        let first = occurrence(text, "#Projects", 0);
        let second = occurrence(text, "#Projects/Sub", first.end);
        let r = replacement("Projects", "Ar");

        let mut forward = text.to_string();
        for occ in [&first, &second] {
            forward = r.in_string(&forward, occ.start);
        }
        assert_ne!(forward, "A #Ar then #Ar/Sub end");

        let unit = RenameUnit::new("n.md", vec![first, second], false);
        let mut backward = text.to_string();
        for occ in unit.occurrences() {
            backward = r.in_string(&backward, occ.start);
        }
        assert_eq!(backward, "A #Ar then #Ar/Sub end");
    }

    #[test]
    fn validate_flags_edited_ranges() {
        let text = "x #Projects y";
        let unit = RenameUnit::new("n.md", vec![occurrence(text, "#Projects", 0)], false);
        let source = TagDescriptor::new("Projects");

        assert_eq!(unit.validate(text, &source), Validation::Valid);
        assert_eq!(unit.validate("x #PROJECTS y", &source), Validation::Valid);

        match unit.validate("xx #Projects y", &source) {
            Validation::Stale { start, found, .. } => {
                assert_eq!(start, 2);
                assert_eq!(found.as_deref(), Some(" #Project"));
            }
            Validation::Valid => panic!("shifted text must be stale"),
        }

        assert!(matches!(
            unit.validate("x", &source),
            Validation::Stale { found: None, .. }
        ));
    }

    #[test]
    fn validate_flags_a_tag_extended_past_its_range() {
        let text = "x #Projects\n";
        let unit = RenameUnit::new("n.md", vec![occurrence(text, "#Projects", 0)], false);
        let source = TagDescriptor::new("Projects");

        assert!(matches!(
            unit.validate("x #ProjectsArchive\n", &source),
            Validation::Stale { .. }
        ));
        assert!(matches!(
            unit.validate("x #Projects/Sub\n", &source),
            Validation::Stale { .. }
        ));
        assert_eq!(unit.validate("x #Projects/ and more", &source), Validation::Valid);
        assert_eq!(unit.validate("x #Projects.", &source), Validation::Valid);
    }

    #[test]
    fn extended_tag_is_not_rewritten() {
        let dir = tempdir().unwrap();
        let content = "x #Projects\n";
        std::fs::write(dir.path().join("n.md"), content).unwrap();
        let corpus = DiskCorpus::open(dir.path(), Settings::default()).unwrap();
        let unit = RenameUnit::new("n.md", vec![occurrence(content, "#Projects", 0)], false);

        std::fs::write(dir.path().join("n.md"), "x #ProjectsArchive\n").unwrap();

        let notices = NoticeLog::new();
        let outcome = unit
            .apply(&corpus, &replacement("Projects", "Areas"), &notices)
            .unwrap();
        assert_eq!(outcome, UnitOutcome::Stale);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("n.md")).unwrap(),
            "x #ProjectsArchive\n"
        );
        assert_eq!(notices.messages().len(), 1);
    }

    #[test]
    fn rewrite_frontmatter_touches_only_changed_fields() {
        let mut fm = frontmatter::parse(
            "tags: [projects, inbox]\nTag: projects/x\naliases: [Projects, '#projects']\ntitle: projects\n",
        )
        .unwrap();
        let r = replacement("Projects", "Areas");

        assert!(rewrite_frontmatter(&mut fm, &r));
        assert_eq!(
            fm.get("tags"),
            Some(&Value::Sequence(vec![
                Value::String("Areas".into()),
                Value::String("inbox".into())
            ]))
        );
        assert_eq!(fm.get("Tag"), Some(&Value::String("Areas/x".into())));
        assert_eq!(
            fm.get("aliases"),
            Some(&Value::Sequence(vec![
                Value::String("Projects".into()),
                Value::String("#Areas".into())
            ]))
        );
        assert_eq!(fm.get("title"), Some(&Value::String("projects".into())));

        assert!(!rewrite_frontmatter(&mut fm, &r));
    }

    #[test]
    fn apply_rewrites_body_and_frontmatter() {
        let dir = tempdir().unwrap();
        let content = "---\ntags: [projects]\n---\nSee #Projects/Client and #projects\n";
        std::fs::write(dir.path().join("n.md"), content).unwrap();
        let corpus = DiskCorpus::open(dir.path(), Settings::default()).unwrap();

        let body_start = content.find("See").unwrap();
        let unit = RenameUnit::new(
            "n.md",
            vec![
                occurrence(content, "#Projects/Client", body_start),
                occurrence(content, "#projects", body_start + 20),
            ],
            true,
        );
        let notices = NoticeLog::new();

        let outcome = unit
            .apply(&corpus, &replacement("Projects", "Areas"), &notices)
            .unwrap();

        assert_eq!(outcome, UnitOutcome::Changed);
        let written = std::fs::read_to_string(dir.path().join("n.md")).unwrap();
        assert!(written.ends_with("See #Areas/Client and #Areas\n"), "{}", written);
        assert!(written.contains("- Areas"), "{}", written);
        assert!(notices.messages().is_empty());
    }

    #[test]
    fn stale_document_is_not_written() {
        let dir = tempdir().unwrap();
        let content = "Body #Projects\n";
        std::fs::write(dir.path().join("n.md"), content).unwrap();
        let corpus = DiskCorpus::open(dir.path(), Settings::default()).unwrap();
        let unit = RenameUnit::new("n.md", vec![occurrence(content, "#Projects", 0)], false);

        let edited = "Edited!! Body #Projects\n";
        std::fs::write(dir.path().join("n.md"), edited).unwrap();

        let notices = NoticeLog::new();
        let r = replacement("Projects", "Areas");
        assert!(!unit.renamed(&corpus, &r, &notices).unwrap());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("n.md")).unwrap(),
            edited
        );
        assert_eq!(notices.messages(), vec!["n.md changed before rename; skipping"]);
    }

    #[test]
    fn missing_document_is_unchanged() {
        let dir = tempdir().unwrap();
        let corpus = DiskCorpus::open(dir.path(), Settings::default()).unwrap();
        let unit = RenameUnit::new("gone.md", Vec::new(), true);

        let outcome = unit
            .apply(&corpus, &replacement("a", "b"), &NoticeLog::new())
            .unwrap();
        assert_eq!(outcome, UnitOutcome::Unchanged);
    }
}
