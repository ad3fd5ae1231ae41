use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::Utc;
use tempfile::tempdir;

use super::{
    DEFAULT_OUTCOME_CAPACITY, DEFAULT_SUMMARY_CAPACITY, DEFAULT_SUMMARY_LIST_LIMIT, MemoryStore,
    ResultStore, SqliteStore, StoreLimits,
};
use crate::domain::{LoadTestSummary, ProbeOutcome};

fn outcome(seq: usize) -> ProbeOutcome {
    ProbeOutcome::completed("http://localhost", 200, 1, 0).with_id(format!("outcome-{}", seq))
}

fn summary(seq: usize) -> LoadTestSummary {
    LoadTestSummary {
        id: format!("summary-{}", seq),
        url: "http://localhost".to_owned(),
        total_requests: 0,
        concurrency: 1,
        duration_ms: 0,
        success_count: 0,
        error_count: 0,
        avg_response_time_ms: 0.0,
        min_response_time_ms: 0,
        max_response_time_ms: 0,
        status_codes: BTreeMap::new(),
        timestamp: Utc::now(),
        results: Vec::new(),
    }
}

fn small_limits(outcomes: usize, summaries: usize) -> Result<StoreLimits, String> {
    Ok(StoreLimits {
        outcome_capacity: NonZeroUsize::new(outcomes).ok_or("outcome capacity must be > 0")?,
        summary_capacity: NonZeroUsize::new(summaries).ok_or("summary capacity must be > 0")?,
    })
}

fn expect_ids<I>(actual: I, expected: &[String]) -> Result<(), String>
where
    I: IntoIterator<Item = String>,
{
    let actual: Vec<String> = actual.into_iter().collect();
    if actual != expected {
        return Err(format!("Expected ids {:?}, got {:?}", expected, actual));
    }
    Ok(())
}

async fn check_outcome_eviction(store: &dyn ResultStore, capacity: usize) -> Result<(), String> {
    let total = capacity.saturating_add(1);
    for seq in 0..total {
        store
            .save_outcome(outcome(seq))
            .await
            .map_err(|err| err.to_string())?;
    }
    let listed = store
        .list_outcomes(capacity)
        .await
        .map_err(|err| err.to_string())?;
    let expected: Vec<String> = (1..total).map(|seq| format!("outcome-{}", seq)).collect();
    expect_ids(listed.into_iter().map(|item| item.id), &expected)
}

async fn check_summary_eviction(store: &dyn ResultStore, capacity: usize) -> Result<(), String> {
    let total = capacity.saturating_add(1);
    for seq in 0..total {
        store
            .save_summary(summary(seq))
            .await
            .map_err(|err| err.to_string())?;
    }
    let evicted = store
        .get_summary("summary-0")
        .await
        .map_err(|err| err.to_string())?;
    if evicted.is_some() {
        return Err("Expected evicted summary to be unreachable by id".to_owned());
    }
    let newest_id = format!("summary-{}", capacity);
    let newest = store
        .get_summary(&newest_id)
        .await
        .map_err(|err| err.to_string())?;
    if newest.map(|item| item.id) != Some(newest_id) {
        return Err("Expected newest summary to be reachable by id".to_owned());
    }
    let listed = store
        .list_summaries(capacity.saturating_mul(2))
        .await
        .map_err(|err| err.to_string())?;
    if listed.len() != capacity {
        return Err(format!(
            "Expected {} summaries, got {}",
            capacity,
            listed.len()
        ));
    }
    Ok(())
}

#[tokio::test]
async fn memory_store_keeps_most_recent_thousand_outcomes() -> Result<(), String> {
    let store = MemoryStore::default();
    check_outcome_eviction(&store, DEFAULT_OUTCOME_CAPACITY.get()).await
}

#[tokio::test]
async fn memory_store_forgets_evicted_summary_ids() -> Result<(), String> {
    let store = MemoryStore::default();
    check_summary_eviction(&store, DEFAULT_SUMMARY_CAPACITY.get()).await
}

#[tokio::test]
async fn memory_store_lists_recent_window_oldest_first() -> Result<(), String> {
    let store = MemoryStore::default();
    for seq in 0..5 {
        store
            .save_outcome(outcome(seq))
            .await
            .map_err(|err| err.to_string())?;
    }
    let listed = store.list_outcomes(3).await.map_err(|err| err.to_string())?;
    let expected: Vec<String> = (2..5).map(|seq| format!("outcome-{}", seq)).collect();
    expect_ids(listed.into_iter().map(|item| item.id), &expected)?;

    let everything = store
        .list_outcomes(50)
        .await
        .map_err(|err| err.to_string())?;
    if everything.len() != 5 {
        return Err(format!("Expected 5 outcomes, got {}", everything.len()));
    }
    Ok(())
}

#[tokio::test]
async fn memory_store_zero_limit_uses_default_window() -> Result<(), String> {
    let store = MemoryStore::default();
    let total = DEFAULT_SUMMARY_LIST_LIMIT.saturating_add(10);
    for seq in 0..total {
        store
            .save_summary(summary(seq))
            .await
            .map_err(|err| err.to_string())?;
    }
    let listed = store
        .list_summaries(0)
        .await
        .map_err(|err| err.to_string())?;
    if listed.len() != DEFAULT_SUMMARY_LIST_LIMIT {
        return Err(format!(
            "Expected default window of {}, got {}",
            DEFAULT_SUMMARY_LIST_LIMIT,
            listed.len()
        ));
    }
    let first = listed.first().map(|item| item.id.clone());
    if first != Some("summary-10".to_owned()) {
        return Err(format!("Unexpected oldest entry {:?}", first));
    }
    Ok(())
}

#[tokio::test]
async fn memory_store_resaved_id_survives_eviction_of_older_copy() -> Result<(), String> {
    let store = MemoryStore::new(small_limits(1, 2)?);
    store
        .save_summary(summary(7))
        .await
        .map_err(|err| err.to_string())?;
    store
        .save_summary(summary(7))
        .await
        .map_err(|err| err.to_string())?;
    store
        .save_summary(summary(8))
        .await
        .map_err(|err| err.to_string())?;
    let found = store
        .get_summary("summary-7")
        .await
        .map_err(|err| err.to_string())?;
    if found.is_none() {
        return Err("Expected the retained copy to stay reachable".to_owned());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_store_handles_concurrent_writers() -> Result<(), String> {
    let store = Arc::new(MemoryStore::new(small_limits(10_000, 10)?));
    let mut handles = Vec::new();
    for writer in 0..8usize {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for seq in 0..100usize {
                let id = writer.saturating_mul(1000).saturating_add(seq);
                if let Err(err) = store.save_outcome(outcome(id)).await {
                    return Err(err.to_string());
                }
                if let Err(err) = store.list_outcomes(10).await {
                    return Err(err.to_string());
                }
            }
            Ok(())
        }));
    }
    for handle in handles {
        handle.await.map_err(|err| err.to_string())??;
    }
    let listed = store
        .list_outcomes(10_000)
        .await
        .map_err(|err| err.to_string())?;
    if listed.len() != 800 {
        return Err(format!("Expected 800 outcomes, got {}", listed.len()));
    }
    Ok(())
}

#[tokio::test]
async fn sqlite_store_evicts_like_memory_store() -> Result<(), String> {
    let store = SqliteStore::open_in_memory(small_limits(20, 5)?)
        .await
        .map_err(|err| err.to_string())?;
    check_outcome_eviction(&store, 20).await?;
    check_summary_eviction(&store, 5).await
}

#[tokio::test]
async fn sqlite_store_persists_across_reopen() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("history.db");
    let mut saved = summary(1);
    saved.results.push(outcome(0).with_id("summary-1-0".to_owned()));
    saved.status_codes.insert(200, 1);

    {
        let store = SqliteStore::open(&path, StoreLimits::default())
            .await
            .map_err(|err| err.to_string())?;
        store
            .save_summary(saved.clone())
            .await
            .map_err(|err| err.to_string())?;
        store
            .save_outcome(outcome(3))
            .await
            .map_err(|err| err.to_string())?;
    }

    let reopened = SqliteStore::open(&path, StoreLimits::default())
        .await
        .map_err(|err| err.to_string())?;
    let loaded = reopened
        .get_summary("summary-1")
        .await
        .map_err(|err| err.to_string())?
        .ok_or("Expected stored summary after reopen")?;
    if loaded != saved {
        return Err(format!("Round-tripped summary differs: {:?}", loaded));
    }
    let outcomes = reopened
        .list_outcomes(0)
        .await
        .map_err(|err| err.to_string())?;
    expect_ids(
        outcomes.into_iter().map(|item| item.id),
        &["outcome-3".to_owned()],
    )
}

#[tokio::test]
async fn sqlite_store_reports_missing_summary() -> Result<(), String> {
    let store = SqliteStore::open_in_memory(StoreLimits::default())
        .await
        .map_err(|err| err.to_string())?;
    let found = store
        .get_summary("missing")
        .await
        .map_err(|err| err.to_string())?;
    if found.is_some() {
        return Err("Expected no summary".to_owned());
    }
    Ok(())
}
