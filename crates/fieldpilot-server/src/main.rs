use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use fieldpilot_assistant::{AssistantConfig, HttpAssistantClient, WaitPolicy};
use fieldpilot_server::http;
use fieldpilot_server::service::{AppState, ThreadLockRegistry};
use fieldpilot_store::{FileStore, MemoryStore, RecordStore};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fieldpilot-server")]
struct Args {
    #[arg(long, env = "FIELDPILOT_HTTP_ADDR", default_value = "127.0.0.1:8080")]
    http_addr: String,

    /// Directory for persisted records. When unset, records live in
    /// memory only and vanish on restart.
    #[arg(long, env = "FIELDPILOT_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Give up on an assistant run after this many seconds.
    /// Unset reproduces the service default of waiting indefinitely.
    #[arg(long, env = "FIELDPILOT_MAX_WAIT_SECS")]
    max_wait_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Credentials are checked here, at boot, so a missing key fails the
    // process instead of the first request.
    let config = match AssistantConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(2);
        }
    };

    let store: Arc<dyn RecordStore> = match &args.storage_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using file store");
            Arc::new(FileStore::new(dir))
        }
        None => {
            tracing::info!("no storage dir configured, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let assistant = Arc::new(HttpAssistantClient::new(&config));
    let wait = WaitPolicy {
        max_wait: args.max_wait_secs.map(Duration::from_secs),
        ..Default::default()
    };

    let app = http::router(AppState {
        store,
        assistant,
        config,
        wait,
        thread_locks: Arc::new(ThreadLockRegistry::default()),
    });

    let listener = tokio::net::TcpListener::bind(&args.http_addr)
        .await
        .expect("failed to bind http listener");
    tracing::info!(addr = %args.http_addr, "fieldpilot server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("http server crashed");
}
