//! Application entry point — Subtitle Studio.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build the event bus and attach a console printer.
//! 4. Check model readiness; drive a download when artifacts are missing.
//! 5. Apply the startup cache sweep for the time-based strategies.
//! 6. Enqueue the media paths given on the command line.
//! 7. Drain the queue and report the final cache size.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;

use subtitle_studio::{
    bus::{BusEvent, EventBus},
    cache::{format_size, CacheAccountant, FsCacheStore},
    config::{AppConfig, AppPaths, TomlSettingsStore},
    media::FsPathResolver,
    models::{FsModelInventory, HttpModelFetcher, ModelCoordinator},
    pipeline::ProcessPipelineRunner,
    queue::QueueOrchestrator,
};

// ---------------------------------------------------------------------------
// Console printer
// ---------------------------------------------------------------------------

/// Mirror bus traffic to stdout so a headless run is observable.
async fn run_printer(bus: EventBus) {
    use tokio::sync::broadcast::error::RecvError;

    let mut rx = bus.subscribe();
    loop {
        match rx.recv().await {
            Ok(BusEvent::Log(line)) => println!("{line}"),
            Ok(BusEvent::DownloadStatus(text)) => println!("{text}"),
            Ok(BusEvent::DownloadProgress(percent)) => println!("  {percent}%"),
            Ok(BusEvent::DownloadDone) => println!("Download complete."),
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("printer lagged, skipped {skipped} events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Subtitle Studio starting up");

    // 2. Configuration and paths
    let paths = AppPaths::new();
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Event bus + console printer
    let bus = EventBus::new();
    let printer = tokio::spawn(run_printer(bus.clone()));

    // 4. Model readiness gate
    let coordinator = ModelCoordinator::new(
        Arc::new(FsModelInventory::new(&paths.models_dir)),
        Arc::new(HttpModelFetcher::new(&paths.models_dir)),
        bus.clone(),
    );
    if !coordinator.check().is_ready() {
        log::info!("Required models are missing; starting download");
        coordinator.download().await;
        if !coordinator.state().is_ready() {
            bail!("model download failed; re-run to retry");
        }
    }

    // 5. Cache accounting + startup sweep
    let settings = Arc::new(TomlSettingsStore::open(&paths.settings_file)?);
    let cache = Arc::new(CacheAccountant::new(
        Arc::new(FsCacheStore::new(&paths.cache_dir)),
        settings,
        bus.clone(),
    ));
    cache.startup_sweep();

    // 6. Queue wiring
    let runner = ProcessPipelineRunner::new(
        &config.pipeline.interpreter,
        &config.pipeline.script,
        &config.pipeline.workdir,
        config.pipeline.tool_dirs.clone(),
        bus.clone(),
    );
    let orchestrator = Arc::new(QueueOrchestrator::new(
        Arc::new(FsPathResolver::new()),
        Arc::new(runner),
        Arc::clone(&cache),
        bus.clone(),
    ));
    let mapper = tokio::spawn(Arc::clone(&orchestrator).run_status_mapper());

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if args.is_empty() {
        bail!("usage: subtitle-studio <media file or directory>...");
    }
    if orchestrator.enqueue(&args) == 0 {
        bail!("none of the given paths are media files");
    }

    // 7. Drain and report
    orchestrator.start().await;
    println!("Cache size: {}", format_size(cache.refresh()));

    mapper.abort();
    printer.abort();
    Ok(())
}
