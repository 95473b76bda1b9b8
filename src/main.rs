use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use tokio::signal;

use teller::application::engine::ApprovalEngine;
use teller::application::queue::RequestQueue;
use teller::domain::ports::LedgerRef;
use teller::infrastructure::in_memory::InMemoryLedger;
use teller::infrastructure::seed::Seed;
use teller::interfaces::http::api::{AppState, create_router};
use teller::interfaces::http::auth::StaticTokenAuthorizer;
use teller::logging::{self, LogFormat};

/// Savings-account administration backend.
#[derive(Parser)]
#[command(name = "teller", about = "Savings-account administration backend", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service.
    Serve(ServeArgs),
    /// Validate a seed file and print a summary.
    Check(CheckArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Socket address to listen on.
    #[arg(long, env = "TELLER_BIND", default_value = "127.0.0.1:8740")]
    bind: SocketAddr,

    /// JSON seed file with users, API tokens, products, savings accounts,
    /// and queued transactions.
    #[arg(long, env = "TELLER_SEED")]
    seed: Option<PathBuf>,

    /// Log output format: pretty or json.
    #[arg(long, env = "TELLER_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

#[derive(Parser)]
struct CheckArgs {
    /// Seed file to validate.
    #[arg(long)]
    seed: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Check(args) => check(args),
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    logging::init_logging(
        "teller=info,tower_http=debug",
        LogFormat::from_str_lossy(&args.log_format),
    );

    let seed = match &args.seed {
        Some(path) => {
            let seed = load_seed(path)?;
            tracing::info!(path = %path.display(), "seed loaded");
            seed
        }
        None => {
            tracing::warn!("no seed file given; starting with an empty ledger and no API tokens");
            Seed::default()
        }
    };

    let authorizer = Arc::new(StaticTokenAuthorizer::from_seed(&seed));
    let ledger: LedgerRef = Arc::new(InMemoryLedger::from_state(seed.into_state()));
    let state = AppState {
        engine: Arc::new(ApprovalEngine::new(Arc::clone(&ledger))),
        queue: Arc::new(RequestQueue::new(Arc::clone(&ledger))),
        ledger,
        authorizer,
    };

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to bind {}", args.bind))?;
    tracing::info!(addr = %args.bind, "teller listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;
    tracing::info!("teller stopped");
    Ok(())
}

fn check(args: CheckArgs) -> Result<()> {
    let seed = load_seed(&args.seed)?;
    let summary = seed.summary();

    println!("seed OK: {}", args.seed.display());
    println!("  users        : {}", summary.users);
    println!("  products     : {}", summary.products);
    println!("  accounts     : {}", summary.accounts);
    println!(
        "  transactions : {} ({} pending)",
        summary.transactions, summary.pending
    );
    Ok(())
}

fn load_seed(path: &Path) -> Result<Seed> {
    let file = File::open(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to open seed file {}", path.display()))?;
    let seed = Seed::from_reader(BufReader::new(file))
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to parse seed file {}", path.display()))?;
    seed.validate()
        .into_diagnostic()
        .wrap_err_with(|| format!("seed file {} failed validation", path.display()))?;
    Ok(seed)
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
