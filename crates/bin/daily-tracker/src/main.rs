//! # daily-tracker
//!
//! Composition root that wires the adapter to the services and imports a
//! journal file.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars, optional journal path argument)
//! - Initialize logging
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Attach event handlers: record every event, warn about poor nights
//! - Restore the last backup, import the journal, log a summary
//! - Write a fresh backup
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod handlers;
mod import;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use daily_tracker_adapter_memory::{MemoryEntryCache, MemoryEventStore, MemoryRepository};
use daily_tracker_app::cache::CachedRepository;
use daily_tracker_app::event_bus::InProcessEventBus;
use daily_tracker_app::journal::Journal;
use daily_tracker_app::services::sleep_service::SleepService;
use daily_tracker_app::services::task_service::TaskService;
use daily_tracker_domain::sleep_entry::SleepEntry;
use daily_tracker_domain::task_entry::TaskEntry;

use crate::config::Config;
use crate::handlers::{PoorSleepAlert, Recorder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.journal.path = PathBuf::from(path);
    }

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter {:?}", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = &config.journal.path;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read journal {}", path.display()))?;
    let journal: Journal = toml::from_str(&raw)
        .with_context(|| format!("failed to parse journal {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        tasks = journal.tasks.len(),
        nights = journal.nights.len(),
        "journal loaded"
    );

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(config.events.capacity));
    let event_store = Arc::new(MemoryEventStore::new());
    let recorder = tokio::spawn(
        event_bus.subscribe_handler(Recorder::new(Arc::clone(&event_store))),
    );
    let alerts = tokio::spawn(event_bus.subscribe_handler(PoorSleepAlert));

    // Services
    let ttl = config.cache_ttl();
    let task_service = TaskService::new(
        CachedRepository::new(
            MemoryRepository::<TaskEntry>::new(),
            MemoryEntryCache::<TaskEntry>::new(),
            ttl,
        ),
        Arc::clone(&event_bus),
    );
    let sleep_service = SleepService::new(
        CachedRepository::new(
            MemoryRepository::<SleepEntry>::new(),
            MemoryEntryCache::<SleepEntry>::new(),
            ttl,
        ),
        Arc::clone(&event_bus),
    );

    // The journal extends the last snapshot; rows already restored are rejected as duplicates.
    if let Some(path) = config.backup.tasks_path().filter(|path| path.exists()) {
        task_service
            .restore(&path)
            .await
            .with_context(|| format!("failed to restore {}", path.display()))?;
    }
    if let Some(path) = config.backup.sleep_path().filter(|path| path.exists()) {
        sleep_service
            .restore(&path)
            .await
            .with_context(|| format!("failed to restore {}", path.display()))?;
    }

    let report = import::import(journal, &task_service, &sleep_service).await;
    tracing::info!(
        tasks = report.tasks,
        nights = report.nights,
        rejected = report.rejected,
        "journal imported"
    );

    let overview = import::overview(&task_service, &sleep_service).await?;
    for (category, count) in &overview.tasks.per_category {
        tracing::info!(%category, count, "tasks per category");
    }
    tracing::info!(
        average_stress_reduction = overview.tasks.average_stress_reduction,
        healthy_nights = overview.healthy_nights,
        total_nights = overview.total_nights,
        "summary"
    );

    if let Some(dir) = &config.backup.dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create backup dir {}", dir.display()))?;
    }
    if let Some(path) = config.backup.tasks_path() {
        task_service
            .backup(&path)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if let Some(path) = config.backup.sleep_path() {
        sleep_service
            .backup(&path)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    // Dropping every sender handle closes the channel and stops the handlers.
    drop(task_service);
    drop(sleep_service);
    drop(event_bus);
    let recorded = recorder.await.context("event recorder panicked")?;
    let alerted = alerts.await.context("poor sleep alert panicked")?;
    tracing::info!(
        events = event_store.len()?,
        missed = recorded.missed,
        failed = recorded.failed,
        poor_sleep_alerts = alerted.handled,
        "events recorded"
    );
    if recorded.missed > 0 {
        tracing::warn!(
            missed = recorded.missed,
            capacity = config.events.capacity,
            "event store is incomplete, raise events.capacity"
        );
    }

    Ok(())
}
