use clap::Args;
use serde::Serialize;

use retag::corpus::{MetadataIndex, TagCount};
use retag::validation;

use super::{open_corpus, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct TagsArgs {
    /// Only list this tag and its descendants
    #[arg(long, value_name = "TAG")]
    prefix: Option<String>,
}

#[derive(Serialize)]
pub struct TagsOutput {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub total: usize,
    pub tags: Vec<TagCount>,
}

pub fn run(args: TagsArgs, global: &GlobalArgs) -> CmdResult<TagsOutput> {
    let prefix = match args.prefix.as_deref() {
        Some(raw) => Some(validation::require_tag(raw, "prefix")?),
        None => None,
    };

    let corpus = open_corpus(global)?;
    let index = MetadataIndex::build(&corpus)?;
    let tags = index.tag_counts(prefix.as_ref().map(|p| p.canonical_name()));

    Ok((
        TagsOutput {
            command: "tags",
            prefix: prefix.map(|p| p.tag().to_string()),
            total: tags.len(),
            tags,
        },
        0,
    ))
}
