use assetledger::application::engine::LedgerEngine;
use assetledger::domain::ids::AccountId;
use assetledger::domain::ports::LedgerStoreBox;
use assetledger::infrastructure::clock::SystemClock;
use assetledger::infrastructure::in_memory::InMemoryLedgerStore;
use assetledger::interfaces::csv::balance_writer::BalanceWriter;
use assetledger::interfaces::csv::operation_reader::OperationReader;
use assetledger::interfaces::csv::payment_writer::PaymentWriter;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Administrator of a newly created ledger. Ignored when the database
    /// already holds one.
    #[arg(long)]
    admin: AccountId,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Also write the payment log to this CSV file.
    #[arg(long)]
    payments: Option<PathBuf>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    use assetledger::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?)),
        None => Ok(Box::new(InMemoryLedgerStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryLedgerStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = open_store(cli.db_path)?;
    let engine = LedgerEngine::open(store, cli.admin, SystemClock)
        .await
        .into_diagnostic()?;

    // Process operations
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for op_result in reader.operations() {
        match op_result {
            Ok(operation) => {
                if let Err(e) = engine.execute(operation).await {
                    match e.ledger_error() {
                        Some(err) => {
                            eprintln!("Error processing operation: [{}] {}", err.code(), err)
                        }
                        None => eprintln!("Error processing operation: {}", e),
                    }
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    // Collect final state from engine
    let snapshot = engine.shutdown().await.into_diagnostic()?;

    if let Some(path) = cli.payments {
        let file = File::create(path).into_diagnostic()?;
        PaymentWriter::new(file)
            .write_payments(&snapshot.payments)
            .into_diagnostic()?;
    }

    // Output final balances
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_balances(snapshot.balances).into_diagnostic()?;

    Ok(())
}
