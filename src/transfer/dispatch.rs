//! Bounded-concurrency task dispatch and error aggregation.

use super::BatchStats;
use super::task::{TaskEnv, TaskOutcome, TransferTask};
use super::Route;
use crate::error::{Error, TransferError};
use crate::storage::ObjectStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Folds task results into one batch result.
///
/// Shared by reference between tasks; [`drain`](Self::drain) consumes it
/// once every task has finished.
#[derive(Debug, Default)]
pub(crate) struct Aggregator {
    failures: Mutex<Vec<TransferError>>,
    dispatched: AtomicU64,
    transferred: AtomicU64,
    skipped: AtomicU64,
    enumeration_errors: AtomicU64,
    bytes: AtomicU64,
}

impl Aggregator {
    fn dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record(&self, env: &TaskEnv<'_>, result: Result<TaskOutcome, TransferError>) {
        match result {
            Ok(TaskOutcome::Transferred(record)) => {
                self.transferred.fetch_add(1, Ordering::Relaxed);
                self.bytes.fetch_add(record.size, Ordering::Relaxed);
                env.options.complete(&record);
            }
            Ok(TaskOutcome::Skipped) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::debug!(error = %e, "transfer failed");
                self.failures
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(e);
            }
        }
    }

    /// An item the listing could not produce. Logged and counted, never
    /// part of the failures.
    pub(crate) fn enumeration_error(&self, e: &Error) {
        if e.is_cancelled() {
            return;
        }
        tracing::error!(error = %e, "failed to list object");
        self.enumeration_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of tasks handed to the pool so far.
    pub(crate) fn dispatched_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub(crate) fn drain(self) -> (BatchStats, Vec<TransferError>) {
        let failures = self
            .failures
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let stats = BatchStats {
            transferred: self.transferred.into_inner(),
            skipped: self.skipped.into_inner(),
            failed: failures.len() as u64,
            enumeration_errors: self.enumeration_errors.into_inner(),
            bytes: self.bytes.into_inner(),
        };
        (stats, failures)
    }
}

/// Runs one task per matched object on a bounded worker pool.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    pool: Option<rayon::ThreadPool>,
}

impl Dispatcher {
    pub(crate) fn new(parallel: usize) -> Self {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(parallel.max(1))
            .thread_name(|i| format!("objcp-worker-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!("Failed to create thread pool ({e}), using global pool");
                None
            }
        };
        Self { pool }
    }

    /// Feed `objects` to the pool and block until every task finished.
    ///
    /// The listing is consumed on the calling thread, so every worker is
    /// free to run tasks while it is still being consumed. A failing task
    /// never stops its siblings.
    pub(crate) fn run(&self, env: &TaskEnv<'_>, route: Route, objects: ObjectStream) -> Aggregator {
        let aggregator = Aggregator::default();
        match &self.pool {
            Some(pool) => pool.in_place_scope(|scope| feed(scope, env, route, objects, &aggregator)),
            None => rayon::in_place_scope(|scope| feed(scope, env, route, objects, &aggregator)),
        }
        aggregator
    }
}

fn feed<'scope>(
    scope: &rayon::Scope<'scope>,
    env: &'scope TaskEnv<'_>,
    route: Route,
    objects: ObjectStream,
    aggregator: &'scope Aggregator,
) {
    for item in objects {
        let obj = match item {
            Ok(obj) => obj,
            Err(e) => {
                aggregator.enumeration_error(&e);
                continue;
            }
        };
        if obj.is_dir() {
            continue;
        }

        aggregator.dispatched();
        let task = TransferTask::new(route, obj);
        scope.spawn(move |_| aggregator.record(env, task.execute(env)));
    }
}
