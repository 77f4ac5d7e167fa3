//! # daily-tracker-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `EntryReader` / `EntryWriter`: persistence for task and sleep entries
//!   - `EntryCache`: short-lived lookup cache
//!   - `TaskStatistics`: aggregate figures over stored tasks
//!   - `EntryBackup`: file snapshots of a whole store
//!   - `EventPublisher` / `EventStore`: delivery and storage of domain events
//!   - `EventHandler`: typed reactions to published events
//! - Define **driving/inbound ports** as use-case structs:
//!   - `TaskService`: create, start, time and rate tasks
//!   - `SleepService`: log nights and record what happened during them
//! - Parse raw journal rows into validated entries
//! - Provide **in-process infrastructure** (event bus, cached repository)
//!   that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `daily-tracker-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod cache;
pub mod event_bus;
pub mod journal;
pub mod ports;
pub mod services;
