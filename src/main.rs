use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use permit_service::application::orchestrator::TransactionOrchestrator;
use permit_service::application::response::{PageRequest, Reply};
use permit_service::config::ServiceConfig;
use permit_service::domain::context::{AuthType, CallerContext, Permission};
use permit_service::domain::ports::{PermitTransactionRepositoryBox, TransactionTypeRepositoryBox};
use permit_service::infrastructure::in_memory::{
    InMemoryPermitTransactionRepository, InMemoryTransactionTypeRepository,
};
use permit_service::infrastructure::resilience::Resilient;
use permit_service::infrastructure::simulated::{
    SimulatedPaymentClient, SimulatedRateClient, SimulatedTopologyClient,
};
use permit_service::interfaces::json::request_reader::RequestReader;
use permit_service::telemetry;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON service configuration (optional). Defaults apply to every missing field.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Id of the calling user, recorded as the transaction creator.
    #[arg(long, global = true)]
    user_id: Option<u64>,

    #[arg(long, global = true, value_enum, default_value_t = Scope::User)]
    scope: Scope,

    /// Permission held by the caller; may be repeated.
    #[arg(long = "permission", global = true, value_enum)]
    permissions: Vec<PermissionArg>,
}

#[derive(Subcommand)]
enum Command {
    /// Create one transaction per JSON request read from FILE.
    Create { input: PathBuf },
    /// Retrieve a transaction with its recorded payments.
    Get {
        transaction_uuid: Uuid,
        #[arg(long)]
        customer_id: u32,
    },
    /// List transaction types.
    Types {
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        size: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Scope {
    Microservice,
    User,
}

#[derive(Clone, Copy, ValueEnum)]
enum PermissionArg {
    ViewPermitTransaction,
}

impl Cli {
    fn caller(&self) -> CallerContext {
        let scope = match self.scope {
            Scope::Microservice => AuthType::Microservice,
            Scope::User => AuthType::User,
        };
        let mut ctx = CallerContext {
            user_id: self.user_id,
            scope,
            ..CallerContext::default()
        };
        for permission in &self.permissions {
            ctx = ctx.with_permission(match permission {
                PermissionArg::ViewPermitTransaction => Permission::ViewPermitTransaction,
            });
        }
        ctx
    }
}

fn open_repositories(
    db_path: Option<PathBuf>,
) -> Result<(TransactionTypeRepositoryBox, PermitTransactionRepositoryBox)> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        let store = permit_service::infrastructure::rocksdb::RocksDBStore::open(db_path)
            .into_diagnostic()?;
        let types: TransactionTypeRepositoryBox = Box::new(store.clone());
        let transactions: PermitTransactionRepositoryBox = Box::new(store);
        return Ok((types, transactions));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    let types: TransactionTypeRepositoryBox = Box::new(InMemoryTransactionTypeRepository::new());
    let transactions: PermitTransactionRepositoryBox =
        Box::new(InMemoryPermitTransactionRepository::new());
    Ok((types, transactions))
}

fn print_reply(out: &mut impl Write, reply: &Reply) -> Result<()> {
    serde_json::to_writer(&mut *out, reply).into_diagnostic()?;
    writeln!(out).into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();
    let ctx = cli.caller();

    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path).into_diagnostic()?,
        None => ServiceConfig::default(),
    };

    let (transaction_types, transactions) = open_repositories(cli.db_path.clone())?;
    for transaction_type in config.transaction_types.iter().cloned() {
        transaction_types
            .store(transaction_type)
            .await
            .into_diagnostic()?;
    }

    let simulation = &config.simulation;
    let orchestrator = TransactionOrchestrator::new(
        transaction_types,
        transactions,
        Box::new(Resilient::new(
            "rate",
            SimulatedRateClient::new(simulation.rate.clone()),
            &config.rate,
        )),
        Box::new(Resilient::new(
            "topology",
            SimulatedTopologyClient::new(simulation.topology.clone()),
            &config.topology,
        )),
        Box::new(Resilient::new(
            "payments",
            SimulatedPaymentClient::new(simulation.payments.clone()),
            &config.payments,
        )),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Create { input } => {
            let file = File::open(input).into_diagnostic()?;
            let reader = RequestReader::new(BufReader::new(file));
            for request in reader.requests() {
                match request {
                    Ok(request) => {
                        let reply = orchestrator.create_transaction(&ctx, request).await;
                        print_reply(&mut out, &reply)?;
                    }
                    Err(e) => warn!(error = %e, "Skipping unreadable request"),
                }
            }
        }
        Command::Get {
            transaction_uuid,
            customer_id,
        } => {
            let reply = orchestrator
                .get_transaction(&ctx, transaction_uuid, customer_id)
                .await;
            print_reply(&mut out, &reply)?;
        }
        Command::Types { page, size } => {
            let reply = orchestrator
                .list_transaction_types(&ctx, PageRequest { page, size })
                .await;
            print_reply(&mut out, &reply)?;
        }
    }

    Ok(())
}
