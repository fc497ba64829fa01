//! Consumer configuration.

use crate::error::ValidationError;
use crate::message::QueueName;
use chrono::Duration;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Largest batch size accepted by typical queue services (SQS limit)
pub const MAX_BATCH_SIZE_LIMIT: u32 = 10;

/// Longest visibility timeout accepted by typical queue services (SQS limit)
pub const MAX_VISIBILITY_TIMEOUT_HOURS: i64 = 12;

/// Configuration for a queue consumer, immutable for the consumer's lifetime
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    queue_name: QueueName,
    max_batch_size: u32,
    visibility_timeout: Duration,
    poll_wait: Duration,
}

impl ConsumerConfig {
    /// Create configuration with default batch size and timeouts
    pub fn new(queue_name: QueueName) -> Self {
        Self {
            queue_name,
            max_batch_size: 5,
            visibility_timeout: Duration::minutes(2),
            poll_wait: Duration::seconds(20),
        }
    }

    /// Set maximum number of messages per batch
    pub fn with_max_batch_size(mut self, max_batch_size: u32) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Set exclusivity window requested for received messages
    pub fn with_visibility_timeout(mut self, visibility_timeout: Duration) -> Self {
        self.visibility_timeout = visibility_timeout;
        self
    }

    /// Set long-poll wait for each receive call
    pub fn with_poll_wait(mut self, poll_wait: Duration) -> Self {
        self.poll_wait = poll_wait;
        self
    }

    /// Validate configuration limits
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_batch_size == 0 || self.max_batch_size > MAX_BATCH_SIZE_LIMIT {
            return Err(ValidationError::OutOfRange {
                field: "max_batch_size".to_string(),
                message: format!("must be 1-{}", MAX_BATCH_SIZE_LIMIT),
            });
        }

        if self.visibility_timeout < Duration::zero()
            || self.visibility_timeout > Duration::hours(MAX_VISIBILITY_TIMEOUT_HOURS)
        {
            return Err(ValidationError::OutOfRange {
                field: "visibility_timeout".to_string(),
                message: format!("must be 0-{} hours", MAX_VISIBILITY_TIMEOUT_HOURS),
            });
        }

        if self.poll_wait < Duration::zero() {
            return Err(ValidationError::OutOfRange {
                field: "poll_wait".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        Ok(())
    }

    /// Get queue name
    pub fn queue_name(&self) -> &QueueName {
        &self.queue_name
    }

    /// Get maximum batch size
    pub fn max_batch_size(&self) -> u32 {
        self.max_batch_size
    }

    /// Get visibility timeout
    pub fn visibility_timeout(&self) -> Duration {
        self.visibility_timeout
    }

    /// Get poll wait duration
    pub fn poll_wait(&self) -> Duration {
        self.poll_wait
    }
}
