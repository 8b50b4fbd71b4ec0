//! Orchestration tests: purger and cascade driven against an in-memory
//! [`BacktestApi`] fake with scripted behavior and call counters.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::cascade::cascade_delete;
use crate::client::BacktestApi;
use crate::error::{Result, SweepError};
use crate::purge::{purge_strategy_jobs, MAX_PURGE_ROUNDS};
use crate::rename_map::{RenameMap, RenameMapStore};
use crate::types::Job;

#[derive(Default)]
struct FakeState {
    jobs: HashMap<String, Vec<String>>,
    rename_map: Option<RenameMap>,
    missing_listings: HashSet<String>,
    sticky_jobs: bool,
    conflicts_remaining: u32,
    fetch_map_calls: u32,
    list_calls: u32,
    delete_job_calls: u32,
    delete_strategy_calls: u32,
    deleted_strategies: Vec<String>,
}

struct FakeBacktest {
    state: Mutex<FakeState>,
}

impl FakeBacktest {
    fn new() -> Self {
        FakeBacktest {
            state: Mutex::new(FakeState {
                rename_map: Some(RenameMap::new()),
                ..FakeState::default()
            }),
        }
    }

    fn with_jobs(self, strategy_id: &str, job_ids: &[&str]) -> Self {
        self.state.lock().unwrap().jobs.insert(
            strategy_id.to_string(),
            job_ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    fn with_rename_map(self, entries: &[(&str, &str)]) -> Self {
        let map = entries
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        self.state.lock().unwrap().rename_map = Some(map);
        self
    }

    fn failing_rename_fetch(self) -> Self {
        self.state.lock().unwrap().rename_map = None;
        self
    }

    fn with_missing_listing(self, strategy_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .missing_listings
            .insert(strategy_id.to_string());
        self
    }

    /// Deletions stop removing jobs, so listings never drain.
    fn with_sticky_jobs(self) -> Self {
        self.state.lock().unwrap().sticky_jobs = true;
        self
    }

    fn with_conflicts(self, count: u32) -> Self {
        self.state.lock().unwrap().conflicts_remaining = count;
        self
    }

    fn fetch_map_calls(&self) -> u32 {
        self.state.lock().unwrap().fetch_map_calls
    }

    fn list_calls(&self) -> u32 {
        self.state.lock().unwrap().list_calls
    }

    fn delete_job_calls(&self) -> u32 {
        self.state.lock().unwrap().delete_job_calls
    }

    fn delete_strategy_calls(&self) -> u32 {
        self.state.lock().unwrap().delete_strategy_calls
    }

    fn deleted_strategies(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted_strategies.clone()
    }
}

impl BacktestApi for FakeBacktest {
    async fn fetch_rename_map(&self) -> Result<RenameMap> {
        let mut state = self.state.lock().unwrap();
        state.fetch_map_calls += 1;
        match &state.rename_map {
            Some(map) => Ok(map.clone()),
            None => Err(SweepError::UnexpectedStatus {
                endpoint: crate::client::EP_RENAME_MAP,
                status: 503,
                detail: "backend unreachable".to_string(),
            }),
        }
    }

    async fn list_jobs(
        &self,
        strategy_id: &str,
        limit: u32,
        _offset: u32,
    ) -> Result<Option<Vec<Job>>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if state.missing_listings.contains(strategy_id) {
            return Ok(None);
        }
        let page = state
            .jobs
            .get(strategy_id)
            .map(|ids| {
                ids.iter()
                    .take(limit as usize)
                    .map(|id| Job {
                        job_id: id.clone(),
                        strategy_id: Some(strategy_id.to_string()),
                        status: None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Some(page))
    }

    async fn delete_job(&self, job_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.delete_job_calls += 1;
        if !state.sticky_jobs {
            for ids in state.jobs.values_mut() {
                ids.retain(|id| id != job_id);
            }
        }
        Ok(())
    }

    async fn delete_strategy(&self, strategy_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.delete_strategy_calls += 1;
        if state.conflicts_remaining > 0 {
            state.conflicts_remaining -= 1;
            return Err(SweepError::Conflict {
                strategy_id: strategy_id.to_string(),
                detail: "jobs still reference this strategy".to_string(),
            });
        }
        state.deleted_strategies.push(strategy_id.to_string());
        Ok(())
    }
}

fn store() -> (RenameMapStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = RenameMapStore::new(dir.path());
    (store, dir)
}

// ─── Purger ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn purge_empty_strategy_is_single_fetch() {
    let fake = FakeBacktest::new();
    let deleted = purge_strategy_jobs(&fake, "empty").await.unwrap();
    assert_eq!(deleted, 0);
    assert_eq!(fake.list_calls(), 1);
    assert_eq!(fake.delete_job_calls(), 0);
}

#[tokio::test]
async fn purge_five_hundred_jobs_pages_until_drained() {
    let ids: Vec<String> = (0..500).map(|i| format!("job-{i:03}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let fake = FakeBacktest::new().with_jobs("alpha", &id_refs);

    let deleted = purge_strategy_jobs(&fake, "alpha").await.unwrap();
    assert_eq!(deleted, 500);
    // Three non-empty pages (200 + 200 + 100) plus the terminating empty one.
    assert_eq!(fake.list_calls(), 4);
    assert_eq!(fake.delete_job_calls(), 500);
}

#[tokio::test]
async fn purge_missing_listing_is_success() {
    let fake = FakeBacktest::new().with_missing_listing("ghost");
    let deleted = purge_strategy_jobs(&fake, "ghost").await.unwrap();
    assert_eq!(deleted, 0);
    assert_eq!(fake.delete_job_calls(), 0);
}

#[tokio::test]
async fn purge_round_cap_is_a_hard_error() {
    let fake = FakeBacktest::new()
        .with_jobs("stuck", &["j-1", "j-2", "j-3"])
        .with_sticky_jobs();

    let err = purge_strategy_jobs(&fake, "stuck").await.unwrap_err();
    match err {
        SweepError::PurgeLimitExceeded { strategy_id, rounds } => {
            assert_eq!(strategy_id, "stuck");
            assert_eq!(rounds, MAX_PURGE_ROUNDS);
        }
        other => panic!("expected PurgeLimitExceeded, got {other}"),
    }
    assert_eq!(fake.list_calls(), MAX_PURGE_ROUNDS);
    assert_eq!(fake.delete_job_calls(), MAX_PURGE_ROUNDS * 3);
}

// ─── Cascade ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn cascade_rejects_blank_id_before_any_io() {
    let fake = FakeBacktest::new();
    let (store, _dir) = store();
    let err = cascade_delete(&fake, &store, "   ").await.unwrap_err();
    assert!(matches!(err, SweepError::EmptyStrategyId));
    assert_eq!(fake.fetch_map_calls(), 0);
    assert_eq!(fake.list_calls(), 0);
    assert_eq!(fake.delete_strategy_calls(), 0);
}

#[tokio::test]
async fn cascade_with_no_history_and_no_jobs() {
    let fake = FakeBacktest::new();
    let (store, _dir) = store();
    let outcome = cascade_delete(&fake, &store, "plain").await.unwrap();
    assert_eq!(outcome.canonical_id, "plain");
    assert_eq!(outcome.deleted_jobs, 0);
    // Exactly one (empty) page fetch and one strategy delete.
    assert_eq!(fake.list_calls(), 1);
    assert_eq!(fake.delete_strategy_calls(), 1);
    assert_eq!(fake.deleted_strategies(), vec!["plain"]);
}

#[tokio::test]
async fn cascade_purges_all_aliases_and_deletes_canonical() {
    let fake = FakeBacktest::new()
        .with_rename_map(&[("legacy_demo", "demo")])
        .with_jobs("legacy_demo", &["j-1", "j-2"])
        .with_jobs("demo", &["j-3"]);
    let (store, _dir) = store();

    let outcome = cascade_delete(&fake, &store, "legacy_demo").await.unwrap();
    assert_eq!(outcome.canonical_id, "demo");
    assert_eq!(outcome.deleted_jobs, 3);
    assert_eq!(fake.deleted_strategies(), vec!["demo"]);
    // The synced map was persisted for the next run.
    assert_eq!(
        store.load().get("legacy_demo").map(String::as_str),
        Some("demo")
    );
}

#[tokio::test]
async fn cascade_sync_failure_falls_back_to_persisted_map() {
    let fake = FakeBacktest::new()
        .failing_rename_fetch()
        .with_jobs("legacy", &["j-1"]);
    let (store, _dir) = store();
    let persisted = RenameMap::from([("legacy".to_string(), "demo".to_string())]);
    store.save(&persisted).unwrap();

    let outcome = cascade_delete(&fake, &store, "legacy").await.unwrap();
    assert_eq!(outcome.canonical_id, "demo");
    assert_eq!(outcome.deleted_jobs, 1);
    assert_eq!(fake.deleted_strategies(), vec!["demo"]);
    // The failed sync left the local copy untouched.
    assert_eq!(store.load(), persisted);
}

#[tokio::test]
async fn cascade_conflict_repurges_once_then_succeeds() {
    let fake = FakeBacktest::new()
        .with_jobs("s", &["j-1", "j-2", "j-3"])
        .with_conflicts(1);
    let (store, _dir) = store();

    let outcome = cascade_delete(&fake, &store, "s").await.unwrap();
    assert_eq!(outcome.deleted_jobs, 3);
    assert_eq!(fake.delete_strategy_calls(), 2);
    // First purge: one page of jobs plus the empty page; re-purge: one
    // more empty page.
    assert_eq!(fake.list_calls(), 3);
    assert_eq!(fake.deleted_strategies(), vec!["s"]);
}

#[tokio::test]
async fn cascade_second_conflict_is_terminal() {
    let fake = FakeBacktest::new().with_conflicts(2);
    let (store, _dir) = store();

    let err = cascade_delete(&fake, &store, "contested").await.unwrap_err();
    match err {
        SweepError::StillInConflict { strategy_id, detail } => {
            assert_eq!(strategy_id, "contested");
            assert_eq!(detail, "jobs still reference this strategy");
        }
        other => panic!("expected StillInConflict, got {other}"),
    }
    // One purge pass, one delete, one re-purge pass, one retry; no third
    // round of anything.
    assert_eq!(fake.delete_strategy_calls(), 2);
    assert_eq!(fake.list_calls(), 2);
    assert!(fake.deleted_strategies().is_empty());
}

#[tokio::test]
async fn cascade_propagates_unsupported_delete() {
    struct NoDelete;

    impl BacktestApi for NoDelete {
        async fn fetch_rename_map(&self) -> Result<RenameMap> {
            Ok(RenameMap::new())
        }
        async fn list_jobs(
            &self,
            _strategy_id: &str,
            _limit: u32,
            _offset: u32,
        ) -> Result<Option<Vec<Job>>> {
            Ok(Some(Vec::new()))
        }
        async fn delete_job(&self, _job_id: &str) -> Result<()> {
            Ok(())
        }
        async fn delete_strategy(&self, _strategy_id: &str) -> Result<()> {
            Err(SweepError::UnsupportedEndpoint {
                endpoint: crate::client::EP_DELETE_STRATEGY,
                status: 405,
            })
        }
    }

    let (store, _dir) = store();
    let err = cascade_delete(&NoDelete, &store, "s").await.unwrap_err();
    match err {
        SweepError::UnsupportedEndpoint { endpoint, status } => {
            assert_eq!(endpoint, crate::client::EP_DELETE_STRATEGY);
            assert_eq!(status, 405);
        }
        other => panic!("expected UnsupportedEndpoint, got {other}"),
    }
}
