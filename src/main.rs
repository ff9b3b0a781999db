use clap::{Parser, ValueEnum};
use escrow_ledger::application::engine::EscrowEngine;
use escrow_ledger::config::{DEFAULT_AMOUNT_SCALE, DEFAULT_OWNER, EscrowConfig};
use escrow_ledger::domain::identity::Identity;
use escrow_ledger::domain::ports::LedgerStoreBox;
use escrow_ledger::infrastructure::in_memory::InMemoryLedgerStore;
use escrow_ledger::interfaces::csv::command_reader::CommandReader;
use escrow_ledger::interfaces::csv::report_writer::{OutputFormat, ReportWriter, Summary};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    Orders,
    Accounts,
    Sellers,
    Summary,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file (op, caller, counterparty, order, amount)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "ESCROW_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Identity recorded as the ledger owner
    #[arg(long, env = "ESCROW_OWNER", default_value = DEFAULT_OWNER)]
    owner: String,

    /// Maximum fractional digits accepted in an order amount
    #[arg(long, default_value_t = DEFAULT_AMOUNT_SCALE)]
    amount_scale: u32,

    /// Report written to stdout once all commands are processed
    #[arg(long, value_enum, default_value_t = Report::Orders)]
    report: Report,

    /// Output format of the report
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    use escrow_ledger::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        None => Ok(Box::new(InMemoryLedgerStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    if db_path.is_some() {
        warn!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryLedgerStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = EscrowConfig {
        owner: Identity::from(cli.owner),
        amount_scale: cli.amount_scale,
    };
    let store = open_store(cli.db_path)?;
    let engine = EscrowEngine::open(store, config).await.into_diagnostic()?;

    // Process commands in file order
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for (line, command) in reader.commands().enumerate() {
        let op = match command.and_then(|c| c.into_operation()) {
            Ok(op) => op,
            Err(e) => {
                warn!(line = line + 2, "Error reading command: {e}");
                continue;
            }
        };
        let caller = op.caller().clone();
        match engine.execute(op).await {
            Ok(outcome) => debug!(%caller, ?outcome, "command applied"),
            Err(e) if e.is_rejection() => {
                warn!(line = line + 2, %caller, "Operation rejected: {e}")
            }
            Err(e) => error!(line = line + 2, %caller, "Error processing command: {e}"),
        }
    }

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock(), cli.format);
    let written = match cli.report {
        Report::Orders => writer.write_orders(&engine.get_orders().await),
        Report::Accounts => writer.write_accounts(&engine.accounts().await),
        Report::Sellers => writer.write_sellers(&engine.list_sellers().await),
        Report::Summary => writer.write_summary(&Summary::new(
            engine.owner(),
            engine.get_balance().await,
            engine.get_total_orders().await,
            engine.get_total_sellers().await,
        )),
    };
    written.into_diagnostic()?;

    Ok(())
}
