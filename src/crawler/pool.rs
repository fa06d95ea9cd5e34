//! Bounded per-item fetch pool
//!
//! The single place where independent remote calls are parallelized.
//! Admission is controlled by a semaphore of configurable width; tasks are
//! spawned in submission order, complete in any order, and a failing task
//! never aborts its siblings: its error is recorded in the outcome and the
//! rest of the batch continues.

use crate::model::ItemRef;
use crate::{HarvestError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Result of one admitted fetch task
#[derive(Debug)]
pub struct FetchOutcome<T> {
    /// The item the task was bound to
    pub item: ItemRef,

    /// The task's result; failures are per-item, never batch-wide
    pub result: Result<T>,
}

/// Admission-controlled worker pool with a fixed width
#[derive(Debug, Clone)]
pub struct FetchPool {
    width: usize,
    permits: Arc<Semaphore>,
}

impl FetchPool {
    /// Creates a pool admitting at most `width` tasks at a time (minimum 1)
    pub fn new(width: u32) -> Self {
        let width = width.max(1) as usize;
        Self {
            width,
            permits: Arc::new(Semaphore::new(width)),
        }
    }

    /// Maximum number of simultaneously admitted tasks
    pub fn width(&self) -> usize {
        self.width
    }

    /// Runs `op` once per item with bounded concurrency
    ///
    /// Tasks are spawned in input order; at most `width` are unresolved at
    /// any instant. All outcomes are collected, successes and failures
    /// alike. Completion order is unspecified.
    pub async fn run_all<T, F, Fut>(&self, items: Vec<ItemRef>, op: F) -> Vec<FetchOutcome<T>>
    where
        F: Fn(ItemRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let op = Arc::new(op);
        let mut tasks = JoinSet::new();

        for item in items {
            let permits = self.permits.clone();
            let op = op.clone();
            tasks.spawn(async move {
                let permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return FetchOutcome {
                            item,
                            result: Err(HarvestError::WorkerPool(
                                "admission semaphore closed".to_string(),
                            )),
                        }
                    }
                };
                let result = op(item.clone()).await;
                drop(permit);
                FetchOutcome { item, result }
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                // A panicked task loses its item binding; report and move on.
                Err(e) => tracing::error!(error = %e, "fetch task panicked"),
            }
        }
        outcomes
    }
}
