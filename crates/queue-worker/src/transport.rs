//! Transport trait consumed by consumers and senders.
//!
//! The transport is an external collaborator: this crate drives the
//! poll/acknowledge protocol against it but never implements a production
//! transport itself. [`crate::providers::InMemoryTransport`] is provided for
//! tests and development.

use crate::error::QueueError;
use crate::message::{MessageId, QueueAddress, QueueName, RawMessage, ReceiptToken};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Duration;

/// Interface implemented by specific queue transports (SQS, in-memory, etc.)
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Resolve a logical queue name to its address.
    ///
    /// Fails with [`QueueError::QueueNotFound`] if the queue does not exist.
    async fn resolve_address(&self, queue: &QueueName) -> Result<QueueAddress, QueueError>;

    /// Receive up to `max_messages` messages, waiting up to `wait` for
    /// availability and requesting `visibility_timeout` of exclusivity on any
    /// messages returned. May return an empty batch.
    async fn receive(
        &self,
        address: &QueueAddress,
        max_messages: u32,
        wait: Duration,
        visibility_timeout: Duration,
    ) -> Result<Vec<RawMessage>, QueueError>;

    /// Delete a delivered message.
    ///
    /// Idempotent from the caller's perspective: deleting an already-deleted
    /// delivery is not an error.
    async fn delete(&self, address: &QueueAddress, receipt: &ReceiptToken)
        -> Result<(), QueueError>;

    /// Change the remaining visibility timeout of a delivered message.
    ///
    /// A zero timeout releases the message for immediate redelivery.
    async fn change_visibility(
        &self,
        address: &QueueAddress,
        receipt: &ReceiptToken,
        timeout: Duration,
    ) -> Result<(), QueueError>;

    /// Submit an encoded message body to the queue
    async fn send(&self, address: &QueueAddress, body: Bytes) -> Result<MessageId, QueueError>;
}
