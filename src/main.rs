use clap::Parser;
use miette::{IntoDiagnostic, Result};
use orderflow::application::service::OrderService;
use orderflow::config::Settings;
use orderflow::domain::catalog::{Customer, Product};
use orderflow::domain::ports::{CatalogStoreRef, OrderStoreRef, PaymentStoreRef};
use orderflow::infrastructure::in_memory::{
    InMemoryCatalogStore, InMemoryOrderStore, InMemoryPaymentStore,
};
use orderflow::interfaces::csv::catalog_reader::CatalogReader;
use orderflow::interfaces::csv::order_writer::OrderWriter;
use orderflow::interfaces::csv::request_reader::RequestReader;
use orderflow::telemetry;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input requests CSV file
    input: PathBuf,

    /// Products CSV (`id, name, price, quantity`) to seed the catalog with
    #[arg(long)]
    products: Option<PathBuf>,

    /// Customers CSV (`id, name`) to seed the catalog with
    #[arg(long)]
    customers: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[command(flatten)]
    settings: Settings,
}

type Stores = (CatalogStoreRef, OrderStoreRef, PaymentStoreRef);

fn in_memory_stores() -> Stores {
    (
        Arc::new(InMemoryCatalogStore::new()),
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(InMemoryPaymentStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    use orderflow::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok((
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                Arc::new(store),
            ))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn read_seed<T: DeserializeOwned>(path: Option<&Path>) -> Result<Vec<T>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let file = File::open(path).into_diagnostic()?;
    CatalogReader::new(file)
        .records()
        .collect::<orderflow::error::Result<Vec<T>>>()
        .into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.settings.log_json);
    let sweep_interval = cli.settings.sweep_interval().into_diagnostic()?;

    let (catalog, orders, payments) = open_stores(cli.db_path)?;
    let service = OrderService::new(catalog, orders, payments);

    // Seed the catalog
    let customers: Vec<Customer> = read_seed(cli.customers.as_deref())?;
    let products: Vec<Product> = read_seed(cli.products.as_deref())?;
    if customers.is_empty() && products.is_empty() {
        service.seed_default_catalog().await.into_diagnostic()?;
    } else {
        service
            .seed_catalog(customers, products)
            .await
            .into_diagnostic()?;
    }

    let shutdown = CancellationToken::new();
    let scheduler = tokio::spawn(service.scheduler(sweep_interval, shutdown.clone()).run());

    // Process requests
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    for request_result in reader.requests() {
        match request_result {
            Ok(request) => {
                if let Err(e) = service.process_request(request).await {
                    eprintln!("Error processing request: {}", e);
                    if !e.is_domain() {
                        error!(error = %e, "request failed on an internal error");
                    }
                }
            }
            Err(e) => {
                eprintln!("Error reading request: {}", e);
            }
        }
    }

    shutdown.cancel();
    scheduler.await.into_diagnostic()?;

    // Collect final state
    let mut report = Vec::new();
    for order in service.list_orders(None).await.into_diagnostic()? {
        let paid = service.paid_total(order.id).await.into_diagnostic()?;
        report.push((order, paid));
    }

    // Output final state
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(report).into_diagnostic()?;

    Ok(())
}
