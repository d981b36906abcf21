use std::path::PathBuf;

use awards_review::error::AppError;
use clap::{Args, Parser, Subcommand};

use crate::ops;
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Awards Review Service",
    about = "Run the awards review service and its round-management commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Balance ballot assignments across the reviewer pool
    Assign(AssignArgs),
    /// Load entries or reviewers into the round state
    Import {
        #[command(subcommand)]
        command: ImportCommand,
    },
    /// Write the per-category result sheets
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
enum ImportCommand {
    /// Replace the entry catalog from a forms-provider JSON export
    Entries(ImportEntriesArgs),
    /// Add reviewers from a first,last,email CSV sheet
    Reviewers(ImportReviewersArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Round state file to seed the in-memory store from
    #[arg(long)]
    pub(crate) state: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct AssignArgs {
    /// Round state file to read and, when committing, write back
    #[arg(long)]
    pub(crate) state: PathBuf,
    /// Reviews per entry; defaults to the configured value
    #[arg(long)]
    pub(crate) reviews: Option<u32>,
    /// Write the plan; without this flag the command is a dry run
    #[arg(long)]
    pub(crate) commit: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportEntriesArgs {
    /// JSON export from the nomination forms provider
    pub(crate) file: PathBuf,
    /// Round state file to write
    #[arg(long)]
    pub(crate) state: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ImportReviewersArgs {
    /// Headerless first,last,email CSV sheet
    pub(crate) file: PathBuf,
    /// Round state file to write
    #[arg(long)]
    pub(crate) state: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Round state file to read
    #[arg(long)]
    pub(crate) state: PathBuf,
    /// Directory the per-category CSV sheets land in
    #[arg(long, default_value = "exports")]
    pub(crate) out: PathBuf,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assign(args) => ops::run_assign(args),
        Command::Import {
            command: ImportCommand::Entries(args),
        } => ops::run_import_entries(args),
        Command::Import {
            command: ImportCommand::Reviewers(args),
        } => ops::run_import_reviewers(args),
        Command::Export(args) => ops::run_export(args),
    }
}
