use clap::Args;
use serde::Serialize;

use retag::corpus::{DiskCorpus, MetadataIndex};
use retag::notice::NoticeLog;
use retag::rename::{Collision, CollisionPolicy, RenameOptions, RenameOutcome, Renamer};
use retag::tags::TagDescriptor;

use super::{open_corpus, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct PlanArgs {
    /// Tag to rename from (with or without '#')
    from: String,
    /// Tag to rename to
    to: String,
    /// Scan every document instead of consulting the tag index
    #[arg(long)]
    no_index: bool,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Tag to rename from (with or without '#')
    from: String,
    /// Tag to rename to
    to: String,
    /// What to do when a document would end up with merged tags:
    /// report, merge, exclude (default: from settings, else report)
    #[arg(long, value_name = "POLICY")]
    on_collision: Option<String>,
    /// Scan every document instead of consulting the tag index
    #[arg(long)]
    no_index: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum RenameCommandOutput {
    #[serde(rename = "plan")]
    Plan {
        source: TagDescriptor,
        target: TagDescriptor,
        noop: bool,
        index_used: bool,
        documents: Vec<PlannedDocument>,
        collisions: Vec<Collision>,
    },
    #[serde(rename = "rename")]
    Rename {
        source: TagDescriptor,
        target: TagDescriptor,
        on_collision: CollisionPolicy,
        index_used: bool,
        #[serde(flatten)]
        outcome: RenameOutcome,
        notices: Vec<String>,
    },
}

#[derive(Serialize)]
pub struct PlannedDocument {
    pub path: String,
    pub occurrences: usize,
    pub frontmatter: bool,
}

/// Build the tag index when settings allow it and the caller did not opt out.
fn maybe_index(corpus: &DiskCorpus, no_index: bool) -> retag::Result<Option<MetadataIndex>> {
    if no_index || !corpus.settings().use_index {
        return Ok(None);
    }
    MetadataIndex::build(corpus).map(Some)
}

pub fn run_plan(args: PlanArgs, global: &GlobalArgs) -> CmdResult<RenameCommandOutput> {
    let corpus = open_corpus(global)?;
    let index = maybe_index(&corpus, args.no_index)?;
    let notices = NoticeLog::new();

    let mut renamer = Renamer::new(&corpus, &notices);
    if let Some(index) = &index {
        renamer = renamer.with_index(index);
    }
    let plan = renamer.plan(&args.from, &args.to)?;

    let documents = plan
        .units
        .iter()
        .map(|unit| PlannedDocument {
            path: unit.path().to_string(),
            occurrences: unit.occurrences().len(),
            frontmatter: unit.has_frontmatter_match(),
        })
        .collect();

    Ok((
        RenameCommandOutput::Plan {
            source: plan.source,
            target: plan.target,
            noop: plan.noop,
            index_used: index.is_some(),
            documents,
            collisions: plan.collisions,
        },
        0,
    ))
}

pub fn run_rename(args: RenameArgs, global: &GlobalArgs) -> CmdResult<RenameCommandOutput> {
    let corpus = open_corpus(global)?;
    let on_collision = match args.on_collision.as_deref() {
        Some(policy) => CollisionPolicy::from_str(policy)?,
        None => corpus.settings().on_collision,
    };
    let index = maybe_index(&corpus, args.no_index)?;
    let notices = NoticeLog::new();

    let outcome = {
        let mut renamer = Renamer::new(&corpus, &notices);
        if let Some(index) = &index {
            renamer = renamer.with_index(index);
        }
        renamer.execute(&args.from, &args.to, RenameOptions { on_collision })?
    };

    let exit_code = if outcome.aborted { 1 } else { 0 };

    Ok((
        RenameCommandOutput::Rename {
            source: TagDescriptor::new(&args.from),
            target: TagDescriptor::new(&args.to),
            on_collision,
            index_used: index.is_some(),
            outcome,
            notices: notices.into_messages(),
        },
        exit_code,
    ))
}
