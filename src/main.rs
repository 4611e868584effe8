use clap::Parser;
use coursepay::application::orchestrator::EnrollmentService;
use coursepay::config::PaymentConfig;
use coursepay::domain::ports::{
    CourseStoreRef, NotifierRef, PaymentGatewayRef, ProgressStoreRef, UserStoreRef,
};
use coursepay::infrastructure::gateway::HmacGateway;
use coursepay::infrastructure::in_memory::{
    InMemoryCourseStore, InMemoryProgressStore, InMemoryUserStore,
};
use coursepay::infrastructure::notifier::LogNotifier;
#[cfg(feature = "storage-rocksdb")]
use coursepay::infrastructure::rocksdb::RocksDbStore;
use miette::{IntoDiagnostic, Result};
#[cfg(feature = "storage-rocksdb")]
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Course marketplace payment and enrollment service", long_about = None)]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Shared secret for payment callback signature verification
    #[arg(long, env = "GATEWAY_SECRET")]
    gateway_secret: String,

    /// ISO currency code for orders
    #[arg(long, default_value = "INR")]
    currency: String,

    /// Timeout applied to each gateway call and store operation, in seconds
    #[arg(long, default_value_t = 10)]
    op_timeout_secs: u64,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,
}

type Stores = (CourseStoreRef, UserStoreRef, ProgressStoreRef);

fn in_memory_stores() -> Stores {
    (
        Arc::new(InMemoryCourseStore::new()),
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryProgressStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn build_stores(cli: &Cli) -> Result<Stores> {
    if let Some(db_path) = &cli.db_path {
        let store = RocksDbStore::open(db_path).into_diagnostic()?;
        return Ok((
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        ));
    }
    Ok(in_memory_stores())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn build_stores(_cli: &Cli) -> Result<Stores> {
    Ok(in_memory_stores())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let (courses, users, progress) = build_stores(&cli)?;
    let config = PaymentConfig::new(&cli.gateway_secret, &cli.currency)
        .with_op_timeout(Duration::from_secs(cli.op_timeout_secs));
    let gateway: PaymentGatewayRef = Arc::new(HmacGateway::new(&config.gateway_secret));
    let notifier: NotifierRef = Arc::new(LogNotifier::new());

    let service = Arc::new(EnrollmentService::new(
        courses, users, progress, gateway, notifier, config,
    ));

    tracing::info!(bind = %cli.bind, "starting payment service");
    coursepay::interfaces::http::run(service, cli.bind.as_str())
        .await
        .into_diagnostic()?;

    Ok(())
}
