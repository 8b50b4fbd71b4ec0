//! Cascade deletion orchestrator.

use crate::client::BacktestApi;
use crate::error::{Result, SweepError};
use crate::purge::purge_strategy_jobs;
use crate::rename_map::RenameMapStore;
use crate::resolve::{aliases_of, resolve_canonical};
use crate::types::CascadeOutcome;

/// Delete the strategy identified by `raw_id` (canonical or any historical
/// alias) together with every job ever filed under any of its names.
///
/// Steps: refresh the rename map best-effort, resolve `raw_id` to its
/// canonical id plus alias set, purge jobs for every alias sequentially,
/// then delete the canonical strategy record. A 409 on that delete means
/// the backend still sees job references (typically a job created while
/// the purge was in flight); all aliases are purged once more and the
/// delete retried exactly once. A second 409 is terminal and carries the
/// backend's conflict detail.
///
/// There is no partial-success result: the caller gets a complete
/// [`CascadeOutcome`] or the first terminal error.
///
/// Assumes one active cascade per strategy id. Independent callers racing
/// on the same strategy from different processes are not coordinated, and
/// the single conflict retry is not a substitute for that coordination.
pub async fn cascade_delete(
    client: &impl BacktestApi,
    store: &RenameMapStore,
    raw_id: &str,
) -> Result<CascadeOutcome> {
    let raw = raw_id.trim();
    if raw.is_empty() {
        return Err(SweepError::EmptyStrategyId);
    }

    let map = store.sync(client).await;
    let canonical_id = resolve_canonical(raw, &map);
    let alias_ids = aliases_of(&canonical_id, &map);

    let mut deleted_jobs: u64 = 0;
    for id in &alias_ids {
        deleted_jobs += purge_strategy_jobs(client, id).await?;
    }

    match client.delete_strategy(&canonical_id).await {
        Ok(()) => {}
        Err(SweepError::Conflict { detail, .. }) => {
            tracing::warn!(
                strategy_id = %canonical_id,
                detail = %detail,
                "strategy delete conflicted; re-purging aliases and retrying once"
            );
            for id in &alias_ids {
                deleted_jobs += purge_strategy_jobs(client, id).await?;
            }
            match client.delete_strategy(&canonical_id).await {
                Ok(()) => {}
                Err(SweepError::Conflict { strategy_id, detail }) => {
                    return Err(SweepError::StillInConflict { strategy_id, detail });
                }
                Err(other) => return Err(other),
            }
        }
        Err(other) => return Err(other),
    }

    tracing::info!(strategy_id = %canonical_id, deleted_jobs, "cascade delete complete");
    Ok(CascadeOutcome {
        canonical_id,
        deleted_jobs,
    })
}
