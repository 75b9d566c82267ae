//! Bounded concurrent processing of URL batches.
//!
//! A [`WorkerPool`] fans a batch out over at most `max_workers` in-flight
//! probes, collects results as they complete, and reports progress to a
//! [`ProgressSink`]. A probe that panics is recorded as `Failed` for its
//! task and the rest of the batch carries on.
//!
//! Batches cannot be cancelled once started; they always run to completion.

use crate::error::UrlCheckError;
use crate::types::{CheckResult, Progress, StatusValue, UrlTask};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;

/// Completed-task interval between progress reports.
pub const PROGRESS_INTERVAL: usize = 10;

/// Receives progress notifications while a batch runs.
///
/// Errors returned by a sink are logged and otherwise ignored; they never
/// change the batch result.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress) -> Result<(), UrlCheckError>;
}

/// Sink that discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) -> Result<(), UrlCheckError> {
        Ok(())
    }
}

/// Sink that logs progress at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, progress: Progress) -> Result<(), UrlCheckError> {
        tracing::info!("{}", progress);
        Ok(())
    }
}

/// Manages concurrent URL checking operations.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    max_workers: usize,
}

impl WorkerPool {
    /// Create a pool with the given number of worker slots (at least one).
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Run `probe` for every non-blank task and collect the results.
    ///
    /// Results come back in completion order, each carrying the url and
    /// label of the task it was produced for. Blank tasks are skipped and
    /// are not counted in progress totals.
    pub async fn process<F, Fut>(
        &self,
        tasks: Vec<UrlTask>,
        probe: F,
        progress: &dyn ProgressSink,
    ) -> Vec<CheckResult>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StatusValue> + Send + 'static,
    {
        let tasks: Vec<UrlTask> = tasks.into_iter().filter(|t| !t.is_blank()).collect();
        let total = tasks.len();
        if total == 0 {
            return Vec::new();
        }

        tracing::debug!(total, workers = self.max_workers, "starting batch");

        let probe = Arc::new(probe);
        let jobs = tasks.into_iter().map(|task| {
            let probe = Arc::clone(&probe);
            async move {
                let url = task.url.clone();
                let handle = tokio::spawn(async move { probe(url).await });
                let status = match handle.await {
                    Ok(status) => status,
                    Err(e) => {
                        tracing::warn!(url = %task.url, "worker failed: {}", e);
                        StatusValue::Failed(e.to_string())
                    }
                };
                CheckResult::new(task, status)
            }
        });

        // buffer_unordered keeps at most max_workers jobs polled at once, and
        // a job only spawns its probe when first polled.
        let mut stream = stream::iter(jobs).buffer_unordered(self.max_workers);
        let mut results = Vec::with_capacity(total);

        while let Some(result) = stream.next().await {
            results.push(result);

            let current = Progress {
                completed: results.len(),
                total,
            };
            if current.completed % PROGRESS_INTERVAL == 0 || current.is_finished() {
                if let Err(e) = progress.report(current) {
                    tracing::warn!("Progress sink failed: {}", e);
                }
            }
        }

        results
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(5)
    }
}
