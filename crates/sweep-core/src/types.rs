use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire data model
// ---------------------------------------------------------------------------

/// Lifecycle state reported by the backend for a backtest job.
///
/// Passed through untouched: nothing in this crate branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Running,
    Failed,
    Cancelled,
    Finished,
}

/// One backtest job as listed under a strategy.
///
/// `job_id` is the only field this crate relies on; everything else is
/// optional so older backend versions that omit fields still parse. A
/// missing `job_id` parses as empty and is dropped during purge dedup
/// rather than failing the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub strategy_id: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

// ---------------------------------------------------------------------------
// Cascade result
// ---------------------------------------------------------------------------

/// Terminal result of a successful cascade deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeOutcome {
    /// The id the strategy record was actually deleted under.
    pub canonical_id: String,
    /// Total jobs resolved across every purge pass (deleted or already
    /// absent upstream).
    pub deleted_jobs: u64,
}
