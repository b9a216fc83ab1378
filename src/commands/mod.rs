use std::path::PathBuf;

use retag::corpus::DiskCorpus;
use retag::{config, Error};

pub type CmdResult<T> = retag::Result<(T, i32)>;

/// Flags shared by every subcommand.
pub(crate) struct GlobalArgs {
    pub path: Option<String>,
    pub config: Option<String>,
}

pub mod rename;
pub mod tags;

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Open the corpus named by `--path` (default: current directory) with its
/// settings.
pub(crate) fn open_corpus(global: &GlobalArgs) -> retag::Result<DiskCorpus> {
    let root = match &global.path {
        Some(path) => expand(path),
        None => std::env::current_dir().map_err(|e| {
            Error::internal_io(e.to_string(), Some("resolve current directory".to_string()))
        })?,
    };
    let explicit = global.config.as_deref().map(expand);

    let settings = config::load(&root, explicit.as_deref())?;
    DiskCorpus::open(&root, settings)
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (retag::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Plan(args) => crate::output::map_cmd_result_to_json(rename::run_plan(args, global)),
        crate::Commands::Rename(args) => {
            crate::output::map_cmd_result_to_json(rename::run_rename(args, global))
        }
        crate::Commands::Tags(args) => crate::output::map_cmd_result_to_json(tags::run(args, global)),
    }
}
