use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;

use commands::{rename, tags};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "retag")]
#[command(version = VERSION)]
#[command(about = "Rename hierarchical tags across a markdown corpus")]
struct Cli {
    /// Corpus root directory (default: current directory)
    #[arg(long, global = true)]
    path: Option<String>,

    /// Settings file (default: <root>/.retag.json when present)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what renaming a tag would change, without writing
    Plan(rename::PlanArgs),
    /// Rename a tag and its descendants across the corpus
    Rename(rename::RenameArgs),
    /// List tags in the corpus with document counts
    Tags(tags::TagsArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = GlobalArgs {
        path: cli.path,
        config: cli.config,
    };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    if let Err(err) = output::print_json_result(json_result) {
        eprintln!("{}", err);
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
