use crate::server;
use clap::{Args, Parser, Subcommand};
use payroll_sync::error::AppError;
use payroll_sync::workflows::waiting_events::WaitingEventsImporter;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Payroll Sync",
    about = "Import HR waiting-events exports and submit them to the payroll system",
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
    /// Parse a waiting-events export and print its summary as JSON
    Parse(ParseArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ParseArgs {
    /// CSV or XLSX export to read
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Include every aggregated change record in the output
    #[arg(long)]
    pub(crate) records: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Parse(args) => run_parse(args),
    }
}

fn run_parse(args: ParseArgs) -> Result<(), AppError> {
    let parsed = WaitingEventsImporter::from_path(&args.file)?;
    let summary = parsed.summary();

    let mut output = json!({
        "file": args.file.display().to_string(),
        "logical_id_prefix": parsed.logical_id_prefix,
        "summary": summary,
        "report": parsed.report,
    });
    if args.records {
        output["records"] = json!(parsed.records);
    }

    println!("{output:#}");
    Ok(())
}
