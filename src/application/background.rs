//! Fire-and-forget dispatch for advisory side effects.
//!
//! Cache population, click counting and last-used updates must never delay or
//! fail the request that triggered them. Each one runs as a detached tokio task
//! with its own timeout, so it neither inherits nor outlives the request's
//! cancellation scope by accident. A semaphore bounds how many run at once;
//! when it is saturated new work is dropped and counted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::AppError;

#[derive(Clone)]
pub struct BackgroundTasks {
    permits: Arc<Semaphore>,
    limit: u32,
    timeout: Duration,
}

impl BackgroundTasks {
    /// Creates a dispatcher allowing `limit` concurrent tasks, each bounded by `timeout`.
    pub fn new(limit: u32, timeout: Duration) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit as usize)),
            limit,
            timeout,
        }
    }

    /// Runs `fut` in the background.
    ///
    /// Errors and timeouts are logged with `label`; nothing is returned to the
    /// caller. Returns `false` if the task was dropped because the dispatcher
    /// is saturated.
    pub fn spawn<F>(&self, label: &'static str, fut: F) -> bool
    where
        F: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
            metrics::counter!("background_tasks_dropped_total", "task" => label).increment(1);
            warn!(task = label, "Background task dropped, dispatcher saturated");
            return false;
        };

        let timeout = self.timeout;
        tokio::spawn(async move {
            let _permit = permit;

            match tokio::time::timeout(timeout, fut).await {
                Ok(Ok(())) => {
                    metrics::counter!("background_tasks_completed_total", "task" => label)
                        .increment(1);
                    debug!(task = label, "Background task completed");
                }
                Ok(Err(e)) => {
                    metrics::counter!("background_tasks_failed_total", "task" => label)
                        .increment(1);
                    warn!(task = label, error = %e, details = %e.details(), "Background task failed");
                }
                Err(_) => {
                    metrics::counter!("background_tasks_timed_out_total", "task" => label)
                        .increment(1);
                    warn!(task = label, timeout_ms = timeout.as_millis() as u64, "Background task timed out");
                }
            }
        });

        true
    }

    /// Number of tasks currently running.
    pub fn in_flight(&self) -> usize {
        (self.limit as usize).saturating_sub(self.permits.available_permits())
    }

    /// Waits until every running task has finished, or `timeout` elapses.
    ///
    /// Returns `true` if the dispatcher drained.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let drained = tokio::time::timeout(timeout, self.permits.acquire_many(self.limit)).await;

        match drained {
            Ok(Ok(_all)) => true,
            Ok(Err(_closed)) => true,
            Err(_) => {
                warn!(in_flight = self.in_flight(), "Background tasks still running after grace period");
                false
            }
        }
    }
}
