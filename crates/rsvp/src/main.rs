use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::{signal, sync::broadcast};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rsvp::config::Config;
use rsvp::engine::{run_reconciler, Engine};
use rsvp::gateway::{
    GoogleCalendarConfig, GoogleCalendarGateway, InMemoryCalendarGateway, TimeoutGateway,
};
use rsvp::storage::CachedAttendanceStore;
use rsvp_core::gateway::CalendarGateway;
use rsvp_core::storage::AttendanceStore;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

/// rsvp - Pizza Friday invitations, guest lists and calendar sync
#[derive(Parser, Debug)]
#[command(name = "rsvp")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, short, env = "SQLITE_PATH")]
    database: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", env = "LOG_FORMAT")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let mut config = Config::from_env();
    if let Some(database) = cli.database {
        config.sqlite_path = database;
    }

    let store = open_store(&config).await?;
    let calendar = open_calendar(&config)?;
    let engine = Engine::new(store, calendar, config.engine_config());

    let scheduled = engine
        .store()
        .get_upcoming_fridays(config.lookahead_days)
        .await
        .context("failed to list upcoming Fridays")?;
    tracing::info!(
        calendar_enabled = config.calendar_enabled,
        lookahead_days = config.lookahead_days,
        scheduled = scheduled.len(),
        "rsvp started"
    );

    let (shutdown_tx, _) = broadcast::channel(1);
    let reconciler = config
        .calendar_enabled
        .then(|| tokio::spawn(run_reconciler(engine.clone(), shutdown_tx.subscribe())));

    shutdown_signal().await;
    // No receiver is alive when the reconciler was never started.
    let _ = shutdown_tx.send(());

    if let Some(handle) = reconciler {
        handle.await.context("reconciler task panicked")?;
    }

    tracing::info!("rsvp stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "rsvp=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Opens the configured backend behind the TTL caches.
#[cfg(feature = "sqlite")]
async fn open_store(config: &Config) -> Result<Arc<dyn AttendanceStore>> {
    let repository = rsvp::storage::SqliteRepository::new(&config.sqlite_path)
        .await
        .with_context(|| format!("failed to open database {}", config.sqlite_path))?;
    tracing::info!(path = %config.sqlite_path, "Using SQLite storage");
    Ok(Arc::new(CachedAttendanceStore::new(
        Arc::new(repository),
        config.cache_ttls(),
    )))
}

/// Opens the configured backend behind the TTL caches.
#[cfg(all(feature = "inmemory", not(feature = "sqlite")))]
async fn open_store(config: &Config) -> Result<Arc<dyn AttendanceStore>> {
    tracing::warn!("Using in-memory storage; data is lost on exit");
    Ok(Arc::new(CachedAttendanceStore::new(
        Arc::new(rsvp::storage::InMemoryRepository::new()),
        config.cache_ttls(),
    )))
}

/// Google Calendar bounded by the per-call timeout, or an inert in-memory
/// calendar when integration is disabled.
fn open_calendar(config: &Config) -> Result<Arc<dyn CalendarGateway>> {
    if !config.calendar_enabled {
        return Ok(Arc::new(InMemoryCalendarGateway::new()));
    }

    let access_token = GoogleCalendarConfig::read_access_token(&config.calendar_token_file)
        .with_context(|| {
            format!(
                "failed to read calendar token from {}",
                config.calendar_token_file.display()
            )
        })?;
    let google = GoogleCalendarGateway::new(GoogleCalendarConfig {
        api_url: config.calendar_api_url.clone(),
        calendar_id: config.calendar_id.clone(),
        access_token,
        timezone: config.calendar_timezone,
        timeout: config.calendar_timeout(),
    })?;
    tracing::info!(calendar_id = %config.calendar_id, "Using Google Calendar");

    Ok(Arc::new(TimeoutGateway::new(google, config.calendar_timeout())))
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
