//! punchd - personal work-time tracking service
//!
//! This is the main entry point for the punchd daemon.
//! It wires together all the components:
//! - Settings loading
//! - Store initialization
//! - Tracker engine behind the HTTP API
//! - Reminder scheduler with webhook delivery

mod http;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use http::AppState;
use punch_client::{
    AttendanceProvider, BusinessCalendar, HolidayApiCalendar, HrApiClient, Notifier,
    WebhookClient, WorkweekCalendar,
};
use punch_core::{ReminderScheduler, TrackerEngine};
use punch_store::{SqliteStore, Store};
use punch_util::default_config_path;
use settings::load_settings;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// punchd - Personal work-time tracking service
#[derive(Parser, Debug)]
#[command(name = "punchd")]
#[command(about = "Personal work-time tracking service", long_about = None)]
struct Args {
    /// Settings file path (default: ~/.config/punchd/config.toml)
    #[arg(short, long, env = "PUNCHD_CONFIG", default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Bind address override (or set PUNCHD_BIND env var)
    #[arg(short, long, env = "PUNCHD_BIND")]
    bind: Option<String>,

    /// Database path override (or set PUNCHD_DB env var)
    #[arg(short, long, env = "PUNCHD_DB")]
    db: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "punchd starting");

    // Load settings; CLI arguments win over file values
    let mut settings = load_settings(&args.config)
        .with_context(|| format!("Failed to load settings from {:?}", args.config))?;
    if let Some(bind) = args.bind {
        settings.server.bind = bind;
    }
    if let Some(db) = args.db {
        settings.storage.db_path = db;
    }

    info!(
        config_path = %args.config.display(),
        bind = %settings.server.bind,
        db_path = %settings.storage.db_path.display(),
        "Settings loaded"
    );

    // Create the data directory
    if let Some(parent) = settings.storage.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {:?}", parent))?;
    }

    // Initialize store
    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::open(&settings.storage.db_path).with_context(|| {
            format!("Failed to open database {:?}", settings.storage.db_path)
        })?,
    );
    if !store.is_healthy() {
        warn!("Store health check failed at startup");
    }

    info!(db_path = %settings.storage.db_path.display(), "Store initialized");

    // Engine shared by the HTTP handlers and the scheduler
    let engine = Arc::new(Mutex::new(TrackerEngine::new(store.clone())));

    // Outbound clients
    let attendance: Arc<dyn AttendanceProvider> = Arc::new(HrApiClient::new());
    let notifier: Arc<dyn Notifier> = Arc::new(WebhookClient::new());
    let calendar: Arc<dyn BusinessCalendar> = match &settings.scheduler.holiday_api_url {
        Some(url) => {
            info!(url = %url, "Holiday lookup enabled");
            Arc::new(HolidayApiCalendar::new(
                url.clone(),
                settings.workweek_days(),
            ))
        }
        None => Arc::new(WorkweekCalendar::new(settings.workweek_days())),
    };

    // Reminder scheduler, stopped through a watch channel on shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = ReminderScheduler::new(
        engine.clone(),
        store.clone(),
        calendar,
        notifier,
        attendance.clone(),
    );
    let tick = Duration::from_secs(settings.scheduler.tick_secs);
    let scheduler_handle = tokio::spawn(scheduler.run(tick, shutdown_rx));

    // HTTP API
    let state = AppState { engine, attendance };
    let app = http::router(state);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind)
        .await
        .with_context(|| format!("Failed to bind {:?}", settings.server.bind))?;

    info!(addr = %settings.server.bind, "HTTP API listening");

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

    let shutdown = async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
            _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    // Stop the scheduler once the server has drained
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_handle.await {
        warn!(error = %e, "Scheduler task did not stop cleanly");
    }

    info!("Shutdown complete");
    Ok(())
}
