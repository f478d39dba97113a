//! Concurrent publisher with retry
//!
//! Every valid record is sent on its own task, at most `parallel_degree` at
//! a time. A record's retries run sequentially inside its task, so one
//! record is never in flight twice.

use crate::adapters::queue::MessageQueue;
use crate::config::QueueConfig;
use crate::domain::{CanonicalRecord, ProcessedItem, PublishOutcome, QueueError};
use futures::stream::{self, StreamExt};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Attempt limit and backoff parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &QueueConfig) -> Self {
        Self {
            max_attempts: config.max_retries + 1,
            base_delay: config.retry_delay(),
            max_delay: config.max_retry_delay(),
        }
    }

    /// No retries, used by tests and dry runs
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay after the `attempt`-th failure: `base * 2^(attempt - 1)`, capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of attempts
///
/// `operation` receives the 1-based attempt number. After a retryable
/// failure the task sleeps for `policy.delay_for(attempt)` before trying
/// again. The last error is returned unchanged.
pub async fn retry_with_backoff<T, E, Op, Fut>(
    policy: RetryPolicy,
    context: &str,
    is_retryable: impl Fn(&E) -> bool,
    mut operation: Op,
) -> Result<T, E>
where
    E: Display,
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && is_retryable(&e) => {
                let delay = policy.delay_for(attempt);
                crate::log_retry_attempt!(context, attempt, max_attempts, delay, e);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Sends canonical records through a [`MessageQueue`]
#[derive(Clone)]
pub struct ConcurrentPublisher {
    queue: Arc<dyn MessageQueue>,
    policy: RetryPolicy,
    parallel_degree: usize,
}

impl ConcurrentPublisher {
    pub fn new(queue: Arc<dyn MessageQueue>, policy: RetryPolicy, parallel_degree: usize) -> Self {
        Self {
            queue,
            policy,
            parallel_degree: parallel_degree.max(1),
        }
    }

    /// Publish one record, retrying transient failures
    ///
    /// Returns the queue message id on success.
    pub async fn publish(&self, record: &CanonicalRecord) -> Result<String, QueueError> {
        let sku = record.sku_label().to_string();

        let result = retry_with_backoff(self.policy, &sku, QueueError::is_transient, |attempt| {
            let queue = Arc::clone(&self.queue);
            let sku = sku.clone();
            async move {
                tracing::debug!(sku = %sku, attempt, "Publishing record");
                queue.send(record).await
            }
        })
        .await;

        match &result {
            Ok(message_id) => {
                tracing::info!(sku = %sku, message_id = %message_id, "Record published")
            }
            Err(e) => tracing::error!(sku = %sku, error = %e, "Record publish failed"),
        }
        result
    }

    /// Publish every publishable item, one outcome per item
    ///
    /// Items without a canonical record are skipped. A valid item without an
    /// audit id is skipped with a warning. Outcomes come back in completion
    /// order.
    pub async fn publish_all(&self, items: &[ProcessedItem]) -> Vec<PublishOutcome> {
        let jobs: Vec<_> = items
            .iter()
            .filter(|item| item.is_publishable())
            .filter_map(|item| match (item.audit_id(), item.canonical.as_ref()) {
                (Some(id), Some(record)) => Some((id, record)),
                _ => {
                    tracing::warn!(sku = %item.entry.sku, "Valid item has no audit id, not publishing");
                    None
                }
            })
            .collect();

        stream::iter(jobs)
            .map(|(id, record)| async move {
                match self.publish(record).await {
                    Ok(_) => PublishOutcome::succeeded(id),
                    Err(e) => PublishOutcome::failed(id, e.to_string()),
                }
            })
            .buffer_unordered(self.parallel_degree)
            .collect()
            .await
    }
}
