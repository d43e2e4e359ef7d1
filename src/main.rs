use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod schema;
mod service;
mod utils;

use cmd::{AddArgs, ColumnsArgs, CompleteArgs, SetArgs};

/// listctl - schema-aware CLI for remote tabular list services
///
/// Command layout:
///   listctl columns  <LIST_ID> [--schema-file PATH] [--refresh] [--json]
///   listctl add      <LIST_ID> [--title TEXT] [--field K=V ...] [--field-file PATH]
///   listctl set      <LIST_ID> <ROW_ID> <COLUMN> <VALUE> [--expect-type T,..]
///   listctl complete <LIST_ID> <ROW_ID> [--value RAW]
///
/// Global flags / env:
///   -v / -vv        Increase verbosity
///   -q / --quiet    Errors only
///   -t / --target   List service target (or LISTCTL_TARGET env)
///   LISTCTL_TARGET       Environment fallback if -t not provided
///   LISTCTL_SCHEMA_FILE  Default --schema-file
///   LISTCTL_CACHE_DIR    Schema cache base directory
///
/// Targets:
///   Snapshot file (JSON): e.g.  "./fixtures/board.json"
///   Remote URL (http/https/ws/wss): placeholder only (no transport yet)
///
/// Schema discovery order (short-circuiting):
///   explicit schema file -> cache -> remote metadata -> row inference
///
/// Examples:
///   listctl columns F0123 -t ./board.json
///   listctl add F0123 --title "Buy milk" --field status=open --json
///   listctl set F0123 R1 due 2026-09-01 --expect-type date,todo_due_date
///   listctl complete F0123 R1
#[derive(Parser, Debug)]
#[command(
    name = "listctl",
    version,
    author,
    about = "listctl - schema-aware CLI for remote tabular list services",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Default list service target (snapshot file or remote URL)
    #[arg(short = 't', long = "target", global = true, value_name = "TARGET")]
    target: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a list's resolved column schema
    Columns(ColumnsArgs),

    /// Build the typed field payload for a new row
    Add(AddArgs),

    /// Encode one cell value for an existing row
    Set(SetArgs),

    /// Mark a row's completion checkbox (type-directed column pick)
    Complete(CompleteArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    // Effective global target (CLI flag > LISTCTL_TARGET env)
    let global_target = cli.target.clone().or_else(|| {
        std::env::var("LISTCTL_TARGET")
            .ok()
            .filter(|s| !s.trim().is_empty())
    });

    // Validate if present
    if let Some(t) = &global_target
        && let Err(e) = service::parse_target(t)
    {
        eprintln!("Invalid target '{}': {e}", t);
        std::process::exit(2);
    }

    match cli.command {
        Commands::Columns(mut args) => {
            if args.target.is_none() {
                args.target = global_target.clone();
            }
            cmd::execute_columns(args)
        }
        Commands::Add(mut args) => {
            if args.target.is_none() {
                args.target = global_target.clone();
            }
            cmd::execute_add(args)
        }
        Commands::Set(mut args) => {
            if args.target.is_none() {
                args.target = global_target.clone();
            }
            cmd::execute_set(args)
        }
        Commands::Complete(mut args) => {
            if args.target.is_none() {
                args.target = global_target.clone();
            }
            cmd::execute_complete(args)
        }
    }
}
