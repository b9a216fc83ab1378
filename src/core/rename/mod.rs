//! Tag rename engine: rename a tag and all its descendants across a corpus.
//!
//! Given a source and target tag, the engine:
//! 1. Scans the corpus (or the index's candidates) for documents mentioning the source
//! 2. Checks each document for tags the rename would fold into existing ones
//! 3. Rewrites inline occurrences back to front, then tag and alias front-matter
//!
//! [`Renamer::plan`] stops after step 2; [`Renamer::execute`] runs all three.

mod scan;
mod unit;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::corpus::{Corpus, TagIndex};
use crate::error::{Error, Result};
use crate::notice::Notifier;
use crate::tags::{TagDescriptor, TagReplacement};
use crate::utils::validation;

pub use scan::{collect_rename_files, Candidate};
pub use unit::{RenameUnit, UnitOutcome, Validation};

// ============================================================================
// Types
// ============================================================================

/// What to do when a rename would merge two tags in the same document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Report the collisions and change nothing.
    #[default]
    Report,
    /// Rename anyway; colliding tags end up merged.
    Merge,
    /// Rename everywhere except the colliding documents.
    Exclude,
}

impl CollisionPolicy {
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "report" => Ok(CollisionPolicy::Report),
            "merge" => Ok(CollisionPolicy::Merge),
            "exclude" => Ok(CollisionPolicy::Exclude),
            _ => Err(Error::validation_invalid_argument(
                "on_collision",
                format!("Unknown collision policy '{}'. Use: report, merge, exclude", s),
                Some(s.to_string()),
                Some(vec![
                    "report".to_string(),
                    "merge".to_string(),
                    "exclude".to_string(),
                ]),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
    pub on_collision: CollisionPolicy,
}

impl RenameOptions {
    /// Proceed even when tags would merge.
    pub fn ignore_collisions() -> Self {
        Self {
            on_collision: CollisionPolicy::Merge,
        }
    }
}

/// A document where the rename would fold an existing tag into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub path: String,
    pub original: TagDescriptor,
    pub would_be: TagDescriptor,
}

/// What a rename would do, computed without touching any document.
#[derive(Debug, Clone, Serialize)]
pub struct RenamePlan {
    pub source: TagDescriptor,
    pub target: TagDescriptor,
    pub units: Vec<RenameUnit>,
    pub collisions: Vec<Collision>,
    /// Source and target are the same tag.
    pub noop: bool,
}

/// A document the rename could not finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub path: String,
    pub code: String,
    pub message: String,
}

impl DocumentFailure {
    fn new(path: &str, error: &Error) -> Self {
        Self {
            path: path.to_string(),
            code: error.code.as_str().to_string(),
            message: error.message.clone(),
        }
    }
}

/// The result of [`Renamer::execute`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenameOutcome {
    /// Documents actually modified.
    pub changed: usize,
    pub unchanged: usize,
    /// Documents edited since the scan; left untouched.
    pub stale_skipped: usize,
    /// Colliding documents left alone under [`CollisionPolicy::Exclude`].
    pub excluded: usize,
    pub failures: Vec<DocumentFailure>,
    pub collisions: Vec<Collision>,
    /// Nothing was written because collisions were found under
    /// [`CollisionPolicy::Report`].
    pub aborted: bool,
    pub changed_paths: Vec<String>,
}

// ============================================================================
// Renamer
// ============================================================================

/// Runs renames against one corpus.
///
/// The optional index only narrows which documents are scanned; results are
/// the same with or without it.
pub struct Renamer<'a> {
    corpus: &'a dyn Corpus,
    index: Option<&'a dyn TagIndex>,
    notifier: &'a dyn Notifier,
}

struct Prepared {
    replacement: TagReplacement,
    candidates: Vec<Candidate>,
    collisions: Vec<Collision>,
}

impl<'a> Renamer<'a> {
    pub fn new(corpus: &'a dyn Corpus, notifier: &'a dyn Notifier) -> Self {
        Self {
            corpus,
            index: None,
            notifier,
        }
    }

    pub fn with_index(mut self, index: &'a dyn TagIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Scan and check for collisions without writing anything.
    pub fn plan(&self, source: &str, target: &str) -> Result<RenamePlan> {
        let source = validation::require_tag(source, "from")?;
        let target = validation::require_tag(target, "to")?;

        if source.same_tag(&target) {
            return Ok(RenamePlan {
                source,
                target,
                units: Vec::new(),
                collisions: Vec::new(),
                noop: true,
            });
        }

        let prepared = self.prepare(source, target)?;
        Ok(RenamePlan {
            source: prepared.replacement.source().clone(),
            target: prepared.replacement.target().clone(),
            units: prepared.candidates.into_iter().map(|c| c.unit).collect(),
            collisions: prepared.collisions,
            noop: false,
        })
    }

    /// Rename `source` (and descendants) to `target` across the corpus.
    ///
    /// Invalid tag names fail the whole call. Once writing starts, a failure
    /// in one document is recorded in the outcome and the rest still run.
    pub fn execute(&self, source: &str, target: &str, options: RenameOptions) -> Result<RenameOutcome> {
        let source = validation::require_tag(source, "from")?;
        let target = validation::require_tag(target, "to")?;

        if source.same_tag(&target) {
            log_status!("rename", "{} and {} are the same tag; nothing to do", source, target);
            return Ok(RenameOutcome::default());
        }

        let prepared = self.prepare(source, target)?;
        let mut outcome = RenameOutcome {
            collisions: prepared.collisions,
            ..RenameOutcome::default()
        };

        if !outcome.collisions.is_empty() && options.on_collision == CollisionPolicy::Report {
            log_status!(
                "rename",
                "Aborting: {} document(s) would merge tags",
                outcome.collisions.len()
            );
            outcome.aborted = true;
            return Ok(outcome);
        }

        let excluded_paths: HashSet<String> = match options.on_collision {
            CollisionPolicy::Exclude => outcome.collisions.iter().map(|c| c.path.clone()).collect(),
            _ => HashSet::new(),
        };

        for candidate in &prepared.candidates {
            let path = candidate.unit.path();
            if excluded_paths.contains(path) {
                outcome.excluded += 1;
                continue;
            }

            match candidate
                .unit
                .apply(self.corpus, &prepared.replacement, self.notifier)
            {
                Ok(UnitOutcome::Changed) => {
                    outcome.changed += 1;
                    outcome.changed_paths.push(path.to_string());
                }
                Ok(UnitOutcome::Unchanged) => outcome.unchanged += 1,
                Ok(UnitOutcome::Stale) => outcome.stale_skipped += 1,
                Err(e) => {
                    self.notifier
                        .notice(&format!("{}: {}; skipping", path, e.message));
                    log_status!("rename", "Failed on {}: {}", path, e);
                    outcome.failures.push(DocumentFailure::new(path, &e));
                }
            }
        }

        log_status!(
            "rename",
            "{} → {}: {} changed, {} stale, {} excluded, {} failed",
            prepared.replacement.source(),
            prepared.replacement.target(),
            outcome.changed,
            outcome.stale_skipped,
            outcome.excluded,
            outcome.failures.len()
        );
        Ok(outcome)
    }

    fn prepare(&self, source: TagDescriptor, target: TagDescriptor) -> Result<Prepared> {
        let candidates = collect_rename_files(self.corpus, &source, self.index)?;
        let replacement = TagReplacement::new(source, target);

        let collisions = candidates
            .iter()
            .filter_map(|candidate| {
                replacement
                    .will_merge_tags(&candidate.existing_tags)
                    .map(|merge| Collision {
                        path: candidate.unit.path().to_string(),
                        original: merge.original,
                        would_be: merge.would_be,
                    })
            })
            .collect();

        Ok(Prepared {
            replacement,
            candidates,
            collisions,
        })
    }
}
