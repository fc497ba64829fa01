//! In-memory queue transport for testing and development.
//!
//! This module provides a functional in-memory transport that:
//! - Requires explicit queue creation, so address resolution can fail
//! - Implements visibility timeouts with redelivery
//! - Issues a fresh receipt token for every delivery
//! - Provides thread-safe concurrent access
//!
//! This transport is intended for:
//! - Unit testing of consumers and senders
//! - Development and prototyping
//! - Reference behavior for real transports

use crate::error::QueueError;
use crate::message::{MessageId, QueueAddress, QueueName, RawMessage, ReceiptToken};
use crate::transport::QueueTransport;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

const ADDRESS_SCHEME: &str = "mem://";

/// How often an empty queue is re-checked while a receive call is waiting
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(10);

// ============================================================================
// Internal Storage Structures
// ============================================================================

/// Thread-safe storage for all queues
struct QueueStorage {
    queues: HashMap<QueueName, InMemoryQueue>,
}

impl QueueStorage {
    fn new() -> Self {
        Self {
            queues: HashMap::new(),
        }
    }

    fn queue_mut(&mut self, address: &QueueAddress) -> Result<&mut InMemoryQueue, QueueError> {
        let name = queue_name_for(address)?;
        self.queues
            .get_mut(&name)
            .ok_or(QueueError::QueueNotFound {
                queue_name: name.as_str().to_string(),
            })
    }
}

/// Internal queue state for a single queue
struct InMemoryQueue {
    /// Visible messages (FIFO order)
    messages: VecDeque<StoredMessage>,
    /// In-flight messages keyed by receipt token
    in_flight: HashMap<String, InFlightMessage>,
}

impl InMemoryQueue {
    fn new() -> Self {
        Self {
            messages: VecDeque::new(),
            in_flight: HashMap::new(),
        }
    }

    /// Return timed-out in-flight messages to the visible queue.
    ///
    /// The receipt token issued for the timed-out delivery is forgotten here;
    /// the next delivery of the message carries a fresh one.
    fn reclaim_expired(&mut self, now: DateTime<Utc>) {
        let expired: Vec<String> = self
            .in_flight
            .iter()
            .filter(|(_, in_flight)| in_flight.visible_again_at <= now)
            .map(|(token, _)| token.clone())
            .collect();

        for token in expired {
            if let Some(in_flight) = self.in_flight.remove(&token) {
                self.messages.push_back(in_flight.message);
            }
        }
    }
}

/// A message stored in the queue
#[derive(Clone)]
struct StoredMessage {
    message_id: MessageId,
    body: Bytes,
}

/// A message currently delivered to a consumer
struct InFlightMessage {
    message: StoredMessage,
    visible_again_at: DateTime<Utc>,
}

// ============================================================================
// InMemoryTransport
// ============================================================================

/// In-memory queue transport implementation.
///
/// Cloning is cheap and clones share the same storage, so a test can hand one
/// clone to a consumer and keep another for assertions.
#[derive(Clone)]
pub struct InMemoryTransport {
    storage: Arc<RwLock<QueueStorage>>,
}

impl InMemoryTransport {
    /// Create new transport with no queues
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(QueueStorage::new())),
        }
    }

    /// Create a queue; resolving or sending to a queue that was never created
    /// fails with [`QueueError::QueueNotFound`]
    pub async fn create_queue(&self, queue: &QueueName) {
        let mut storage = self.storage.write().await;
        storage
            .queues
            .entry(queue.clone())
            .or_insert_with(InMemoryQueue::new);
    }

    /// Number of visible (receivable) messages in a queue
    pub async fn visible_count(&self, queue: &QueueName) -> usize {
        let storage = self.storage.read().await;
        storage
            .queues
            .get(queue)
            .map(|q| q.messages.len())
            .unwrap_or(0)
    }

    /// Number of delivered-but-unacknowledged messages in a queue
    pub async fn in_flight_count(&self, queue: &QueueName) -> usize {
        let storage = self.storage.read().await;
        storage
            .queues
            .get(queue)
            .map(|q| q.in_flight.len())
            .unwrap_or(0)
    }

    /// Single receive attempt without waiting
    async fn try_receive(
        &self,
        address: &QueueAddress,
        max_messages: u32,
        visibility_timeout: Duration,
    ) -> Result<Vec<RawMessage>, QueueError> {
        let now = Utc::now();
        let visible_again_at = deadline_after(now, visibility_timeout);
        let mut storage = self.storage.write().await;
        let queue = storage.queue_mut(address)?;

        queue.reclaim_expired(now);

        let mut batch = Vec::new();
        while batch.len() < max_messages as usize {
            let Some(stored) = queue.messages.pop_front() else {
                break;
            };

            let token = uuid::Uuid::new_v4().to_string();
            let raw = RawMessage::new(
                stored.message_id.clone(),
                stored.body.clone(),
                ReceiptToken::new(token.clone()),
            );
            queue.in_flight.insert(
                token,
                InFlightMessage {
                    message: stored,
                    visible_again_at,
                },
            );
            batch.push(raw);
        }

        Ok(batch)
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueTransport for InMemoryTransport {
    async fn resolve_address(&self, queue: &QueueName) -> Result<QueueAddress, QueueError> {
        let storage = self.storage.read().await;
        if !storage.queues.contains_key(queue) {
            return Err(QueueError::QueueNotFound {
                queue_name: queue.as_str().to_string(),
            });
        }

        Ok(QueueAddress::new(format!("{}{}", ADDRESS_SCHEME, queue)))
    }

    async fn receive(
        &self,
        address: &QueueAddress,
        max_messages: u32,
        wait: Duration,
        visibility_timeout: Duration,
    ) -> Result<Vec<RawMessage>, QueueError> {
        let deadline = tokio::time::Instant::now() + wait.to_std().unwrap_or_default();

        loop {
            let batch = self
                .try_receive(address, max_messages, visibility_timeout)
                .await?;
            if !batch.is_empty() {
                return Ok(batch);
            }

            if tokio::time::Instant::now() >= deadline {
                return Ok(Vec::new());
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn delete(
        &self,
        address: &QueueAddress,
        receipt: &ReceiptToken,
    ) -> Result<(), QueueError> {
        let mut storage = self.storage.write().await;
        let queue = storage.queue_mut(address)?;

        // Idempotent: a delete with an unknown or already-used token succeeds
        if queue.in_flight.remove(receipt.as_str()).is_none() {
            tracing::debug!(receipt = %receipt, "delete for unknown receipt token ignored");
        }

        Ok(())
    }

    async fn change_visibility(
        &self,
        address: &QueueAddress,
        receipt: &ReceiptToken,
        timeout: Duration,
    ) -> Result<(), QueueError> {
        let now = Utc::now();
        let mut storage = self.storage.write().await;
        let queue = storage.queue_mut(address)?;

        if timeout <= Duration::zero() {
            // Release: back to the visible queue right away
            let Some(in_flight) = queue.in_flight.remove(receipt.as_str()) else {
                return Err(QueueError::MessageNotFound {
                    receipt: receipt.as_str().to_string(),
                });
            };
            queue.messages.push_back(in_flight.message);
            return Ok(());
        }

        let Some(in_flight) = queue.in_flight.get_mut(receipt.as_str()) else {
            return Err(QueueError::MessageNotFound {
                receipt: receipt.as_str().to_string(),
            });
        };
        in_flight.visible_again_at = deadline_after(now, timeout);

        Ok(())
    }

    async fn send(&self, address: &QueueAddress, body: Bytes) -> Result<MessageId, QueueError> {
        let mut storage = self.storage.write().await;
        let queue = storage.queue_mut(address)?;

        let message_id = MessageId::new();
        queue.messages.push_back(StoredMessage {
            message_id: message_id.clone(),
            body,
        });

        Ok(message_id)
    }
}

/// Deadline for a visibility window, saturating instead of overflowing for
/// out-of-range timeouts
fn deadline_after(now: DateTime<Utc>, timeout: Duration) -> DateTime<Utc> {
    now.checked_add_signed(timeout)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Map an address back to the queue name it was resolved from
fn queue_name_for(address: &QueueAddress) -> Result<QueueName, QueueError> {
    let name = address
        .as_str()
        .strip_prefix(ADDRESS_SCHEME)
        .ok_or_else(|| QueueError::QueueNotFound {
            queue_name: address.as_str().to_string(),
        })?;

    QueueName::new(name.to_string()).map_err(|_| QueueError::QueueNotFound {
        queue_name: name.to_string(),
    })
}
