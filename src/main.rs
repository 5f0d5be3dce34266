use clap::Parser;
use miette::{IntoDiagnostic, Result};
use order_escrow::application::context::Stores;
use order_escrow::application::engine::EscrowEngine;
use order_escrow::config::EscrowConfig;
use order_escrow::infrastructure::gateway::SimulatedGateway;
use order_escrow::infrastructure::notify::TracingNotifier;
use order_escrow::interfaces::csv::order_writer::OrderWriter;
use order_escrow::interfaces::jsonl::command_reader::CommandReader;
use order_escrow::telemetry;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands file, one JSON object per line
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// YAML configuration file (optional). ESCROW_* variables override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => {
            let store = order_escrow::infrastructure::rocksdb::RocksDBStore::open(db_path)?;
            Ok(Stores::rocksdb(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Stores::in_memory())
        }
        None => Ok(Stores::in_memory()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init()?;
    let cli = Cli::parse();

    let config = EscrowConfig::load(cli.config.as_deref())?;
    let stores = open_stores(cli.db_path)?;
    let gateway = Box::new(SimulatedGateway::new(config.gateway.clone()));
    let engine = EscrowEngine::new(stores, gateway, Box::new(TracingNotifier), config);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for (line, command) in reader.commands() {
        match command {
            Ok(command) => {
                let name = command.name();
                match engine.execute(command).await {
                    Ok(_) => info!(command = name, "command applied"),
                    Err(e) => warn!(
                        line,
                        command = name,
                        kind = e.kind().as_str(),
                        error = %e,
                        "Error processing command"
                    ),
                }
            }
            Err(e) => warn!(line, error = %e, "Error reading command"),
        }
    }

    let orders = engine.order_summaries().await?;
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(orders)?;

    Ok(())
}
