mod app;
mod components;
mod config;
mod data;
mod events;
mod render;
mod theme;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::Config;
use crate::data::EventService;
use crate::data::access::AccessClient;
use crate::data::catalog::EventCatalog;
use crate::data::manifest::Manifest;

const LOG_FILE: &str = "autogame-tui.log";

/// Log to a file; the terminal belongs to the UI.
fn init_tracing(log_dir: Option<PathBuf>) -> Result<WorkerGuard> {
    let dir = log_dir
        .or_else(|| dirs::cache_dir().map(|d| d.join("autogame-tui")))
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("cannot create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autogame_tui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::parse();
    let _log_guard = init_tracing(config.log_dir.clone())?;

    // Everything that can fail on bad configuration happens before the terminal is taken over.
    let manifest = Manifest::load(&config.manifest)?;
    let catalog = EventCatalog::new(&manifest, &config.network, &config.contract)?;
    let initial = catalog.resolve(&config.event).ok_or_else(|| {
        eyre!(
            "'{}' is not an event name, a tab number (1-5) or an A.<address>.<Contract>.<Event> identifier",
            config.event
        )
    })?;
    for kind in crate::data::types::EventKind::ALL {
        tracing::debug!(%kind, id = %catalog.id(kind), "event identifier");
    }

    eprintln!("Connecting to {}...", config.access_node);
    let client = AccessClient::connect(&config.access_node)
        .await
        .wrap_err_with(|| format!("cannot reach access node {}", config.access_node))?;
    let sealed_height = client.initial_sealed_height();
    tracing::info!(
        access_node = client.base_url(),
        network = catalog.network(),
        sealed_height,
        "connected"
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let _ = event_tx.send(events::AppEvent::Connected { sealed_height });

    let service = Arc::new(EventService::new(
        client,
        catalog,
        Duration::from_millis(config.poll_interval_ms),
        config.start_height,
        config.export_dir,
        event_tx,
    ));

    let mut app = App::with_service(service, event_rx, initial, config.tick_rate_ms);

    let terminal = ratatui::init();
    let result = app.run(terminal).await;
    ratatui::restore();

    result
}
