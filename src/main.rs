use clap::Parser;
use drivernet::application::engine::{Registries, ResolutionEngine};
use drivernet::domain::events::FineEvent;
use drivernet::infrastructure::in_memory::in_memory_registries;
use drivernet::interfaces::csv::instruction_reader::{Instruction, InstructionReader};
use drivernet::interfaces::csv::report_writer::ReportWriter;
use drivernet::interfaces::event_log::EventLog;
use miette::{IntoDiagnostic, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input instructions CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Append every emitted event to this file as JSON lines.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn open_registries(db_path: Option<PathBuf>) -> Result<Registries> {
    use drivernet::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(db_path) => {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            Ok(store.registries())
        }
        None => Ok(in_memory_registries()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_registries(db_path: Option<PathBuf>) -> Result<Registries> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_registries())
}

async fn apply(
    engine: &ResolutionEngine,
    instruction: Instruction,
) -> drivernet::error::Result<Vec<FineEvent>> {
    match instruction {
        Instruction::RegisterDriver(driver) => {
            engine.register_driver(driver).await.map(|_| Vec::new())
        }
        Instruction::RegisterLawEnforcer(law_enforcer) => engine
            .register_law_enforcer(law_enforcer)
            .await
            .map(|_| Vec::new()),
        Instruction::Issue(request) => engine.issue_fine(request).await,
        Instruction::Resolve(command) => engine.handle(command).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let engine = ResolutionEngine::new(open_registries(cli.db_path)?);

    let mut event_log = match &cli.events {
        Some(path) => Some(EventLog::new(BufWriter::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .into_diagnostic()?,
        ))),
        None => None,
    };

    // Process instructions
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = InstructionReader::new(file);
    for (row, instruction) in reader.instructions().enumerate() {
        match instruction {
            Ok(instruction) => match apply(&engine, instruction).await {
                Ok(events) => {
                    debug!(row, events = events.len(), "Instruction applied");
                    if let Some(log) = event_log.as_mut() {
                        log.record(&events).into_diagnostic()?;
                    }
                }
                Err(e) => error!(row, "Error processing instruction: {}", e),
            },
            Err(e) => error!(row, "Error reading instruction: {}", e),
        }
    }

    if let Some(log) = event_log.as_mut() {
        log.flush().into_diagnostic()?;
    }

    // Output final standing of every driver
    let reports = engine.driver_reports().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_reports(reports).into_diagnostic()?;

    Ok(())
}
