//! `sweep-core` — strategy-identity resolution and cascading deletion for
//! the backtest service.
//!
//! Strategies are renamed over time, and every rename leaves job history
//! behind under the old id. This crate reconciles a locally persisted copy
//! of the backend's from→to rename map, resolves any identifier to its
//! canonical form plus the full alias set, and deletes a strategy together
//! with every backtest job ever filed under it or any of its former names.
//!
//! # Architecture
//!
//! ```text
//! RenameMapStore   ← persists + best-effort refreshes the rename map
//!     │
//!     ▼
//! resolve          ← pure layer: canonical id + alias set (cycle-safe)
//!     │
//!     ▼
//! purge            ← pages through a strategy's jobs, deletes in bounded
//!     │              concurrent batches
//!     ▼
//! cascade_delete   ← sync map → resolve → purge all aliases → delete the
//!                    canonical record, with one conflict-triggered retry
//! ```
//!
//! All remote traffic goes through the [`BacktestApi`] trait so the
//! orchestration layers can be exercised against an in-memory fake;
//! [`ApiClient`] is the reqwest implementation.

pub mod cascade;
pub mod client;
pub mod error;
pub mod purge;
pub mod rename_map;
pub mod resolve;
pub mod types;

mod payload;

#[cfg(test)]
mod tests;

pub use cascade::cascade_delete;
pub use client::{ApiClient, BacktestApi};
pub use error::{Result, SweepError};
pub use rename_map::{RenameMap, RenameMapStore};
pub use resolve::{aliases_of, resolve_canonical};
pub use types::{CascadeOutcome, Job, JobStatus};
