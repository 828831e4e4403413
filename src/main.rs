use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sales_sync::config::{AppConfig, ShopeeSchema};
use sales_sync::io::sheets::SheetsClient;
use sales_sync::sync;
use sales_sync::{Result, SyncError};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(failure) = run(cli) {
        eprintln!("error: {failure}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => execute_run(args),
    }
}

fn execute_run(args: RunArgs) -> Result<()> {
    let config = args.to_config();
    if !config.reports_dir.exists() {
        return Err(SyncError::MissingInput(config.reports_dir));
    }

    if args.once {
        return attempt_run(&config);
    }

    // Interactive mode: each keypress triggers one full run; a failed run is
    // reported and the prompt comes back. Only EOF or an external signal
    // stops the loop.
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("Press Enter to launch a sync run (Ctrl-C to quit)... ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if let Err(failure) = attempt_run(&config) {
            error!(%failure, "run failed");
        }
    }
    Ok(())
}

fn attempt_run(config: &AppConfig) -> Result<()> {
    let sheets = SheetsClient::connect(&config.credentials_path, config.spreadsheet_id.clone())?;
    sync::run_once(config, &sheets)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Consolidate per-account sales reports and append them to a shared spreadsheet."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the consolidation pipeline, interactively or once.
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Directory scanned for per-account report files.
    #[arg(long, default_value = ".")]
    reports_dir: PathBuf,

    /// Directory receiving the consolidated workbooks (defaults to the
    /// reports directory).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Watermark file tracking the last processed order per account.
    #[arg(long, default_value = "watermarks.json")]
    watermark: PathBuf,

    /// Service-account key granting spreadsheet read/write access.
    #[arg(long, default_value = "credentials.json")]
    credentials: PathBuf,

    /// Identifier of the destination Google Sheets document.
    #[arg(long)]
    spreadsheet_id: String,

    /// Worksheet name used inside the consolidated workbooks.
    #[arg(long, default_value = "Sheet1")]
    worksheet: String,

    /// Header of the account column prepended to every row.
    #[arg(long, default_value = "Conta")]
    account_column: String,

    /// Run a single pass instead of the interactive loop.
    #[arg(long)]
    once: bool,
}

impl RunArgs {
    fn to_config(&self) -> AppConfig {
        AppConfig {
            reports_dir: self.reports_dir.clone(),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| self.reports_dir.clone()),
            watermark_path: self.watermark.clone(),
            credentials_path: self.credentials.clone(),
            spreadsheet_id: self.spreadsheet_id.clone(),
            worksheet_name: self.worksheet.clone(),
            account_column: self.account_column.clone(),
            shopee: ShopeeSchema::default(),
        }
    }
}
