//! Job purger: drains every backtest job filed under one strategy id.
//!
//! Pagination is deliberately simple: the page offset is always 0 because
//! each page's jobs are deleted before the next fetch, so the remaining
//! jobs shift down into the first page. The round cap turns a backend that
//! keeps returning jobs (or a deletion that silently does nothing) into a
//! hard error instead of an infinite loop.

use std::collections::HashSet;

use futures::future;

use crate::client::BacktestApi;
use crate::error::{Result, SweepError};
use crate::types::Job;

pub const JOB_PAGE_SIZE: u32 = 200;
pub const DELETE_BATCH_SIZE: usize = 10;
pub const MAX_PURGE_ROUNDS: u32 = 500;

/// Delete all jobs belonging to `strategy_id` and return how many were
/// resolved (removed, or already absent upstream).
///
/// Deletions within one page run in batches of [`DELETE_BATCH_SIZE`]; the
/// batch is fully joined before the next one starts, bounding concurrent
/// load on the backend. Page fetches never overlap. Errors other than the
/// tolerated 404s abort the purge unchanged; exhausting
/// [`MAX_PURGE_ROUNDS`] yields [`SweepError::PurgeLimitExceeded`], which
/// callers must treat as retry-later rather than success.
pub async fn purge_strategy_jobs(client: &impl BacktestApi, strategy_id: &str) -> Result<u64> {
    let mut deleted: u64 = 0;
    for _ in 0..MAX_PURGE_ROUNDS {
        let Some(page) = client.list_jobs(strategy_id, JOB_PAGE_SIZE, 0).await? else {
            // Listing 404: the backend no longer knows the id at all.
            return Ok(deleted);
        };
        let job_ids = dedup_job_ids(&page);
        if job_ids.is_empty() {
            return Ok(deleted);
        }
        for batch in job_ids.chunks(DELETE_BATCH_SIZE) {
            let results = future::join_all(batch.iter().map(|id| client.delete_job(id))).await;
            for result in results {
                result?;
            }
            deleted += batch.len() as u64;
        }
        tracing::debug!(strategy_id, page_jobs = job_ids.len(), "purged one page of jobs");
    }
    Err(SweepError::PurgeLimitExceeded {
        strategy_id: strategy_id.to_string(),
        rounds: MAX_PURGE_ROUNDS,
    })
}

/// Trimmed, order-preserving, de-duplicated job ids from one page; blank
/// ids are dropped.
fn dedup_job_ids(jobs: &[Job]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for job in jobs {
        let id = job.job_id.trim();
        if id.is_empty() || !seen.insert(id) {
            continue;
        }
        ids.push(id.to_string());
    }
    ids
}
