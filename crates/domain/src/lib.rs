//! # daily-tracker-domain
//!
//! Pure domain model for the daily tracker: task-execution and sleep logs.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define bounded **value objects** (0–10 scales, task categories)
//! - Define the **entities** [`TaskEntry`](task_entry::TaskEntry) and
//!   [`SleepEntry`](sleep_entry::SleepEntry) with their controlled mutations
//! - Define **domain events** and the buffer entities record them into
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! Persistence and event delivery are expressed as traits in the `app` crate.

pub mod error;
pub mod id;
pub mod time;

pub mod category;
pub mod event;
pub mod level;
pub mod sleep_entry;
pub mod task_entry;
