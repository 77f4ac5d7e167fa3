//! # daily-tracker-adapter-memory
//!
//! In-memory persistence adapter.
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `daily-tracker-app::ports::storage`
//!   for both task and sleep entries
//! - Answer task statistics queries
//! - Provide a TTL-bounded [`EntryCache`](daily_tracker_app::ports::EntryCache)
//! - Keep published events in an append-only [`EventStore`](daily_tracker_app::ports::EventStore)
//!
//! Everything lives in process memory and is lost on exit.
//!
//! ## Dependency rule
//! Depends on `daily-tracker-app` (for port traits) and `daily-tracker-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod cache;
pub mod error;
pub mod event_store;
pub mod repository;

pub use cache::MemoryEntryCache;
pub use error::MemoryStoreError;
pub use event_store::MemoryEventStore;
pub use repository::MemoryRepository;
