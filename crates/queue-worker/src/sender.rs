//! Queue sender publishing one message at a time to a pre-resolved queue.

use crate::codec::JsonCodec;
use crate::error::QueueError;
use crate::message::{MessageId, QueueAddress, QueueName};
use crate::transport::QueueTransport;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

#[cfg(test)]
#[path = "sender_tests.rs"]
mod tests;

/// Stateless publisher for one queue and one message type
pub struct QueueSender<T> {
    transport: Arc<dyn QueueTransport>,
    queue_name: QueueName,
    address: QueueAddress,
    _message_type: PhantomData<fn(T)>,
}

impl<T> QueueSender<T>
where
    T: Serialize,
{
    /// Create sender, resolving the queue address once.
    ///
    /// Construction fails if resolution fails; there is no retry.
    pub async fn new(
        transport: Arc<dyn QueueTransport>,
        queue_name: QueueName,
    ) -> Result<Self, QueueError> {
        debug!(queue = %queue_name, "resolving queue address");
        let address = transport.resolve_address(&queue_name).await?;
        debug!(queue = %queue_name, address = %address, "queue address resolved");

        Ok(Self {
            transport,
            queue_name,
            address,
            _message_type: PhantomData,
        })
    }

    /// Encode and submit one message.
    ///
    /// Transport errors propagate to the caller unmodified; there is no retry,
    /// buffering, or delivery confirmation beyond the returned message id.
    pub async fn send(&self, message: &T) -> Result<MessageId, QueueError> {
        let body = JsonCodec::encode(message)?;
        debug!(queue = %self.queue_name, "sending message");
        self.transport.send(&self.address, body).await
    }

    /// Get the resolved queue address
    pub fn address(&self) -> &QueueAddress {
        &self.address
    }
}
