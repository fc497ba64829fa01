//! Queue consumer driving at-least-once message processing.
//!
//! A [`QueueConsumer`] owns the poll/decode/dispatch/acknowledge loop for one
//! queue and one message type. Every received message reaches exactly one
//! terminal action before the next message is examined:
//!
//! - decode failure: the message is deleted without invoking the handler; a
//!   body whose shape cannot be understood cannot be understood on redelivery
//!   either, so retrying it would loop forever
//! - handler success: the message is deleted
//! - handler failure: the message's visibility timeout is set to zero,
//!   releasing it for immediate redelivery
//!
//! No redelivery cap or backoff is applied here; that policy belongs to the
//! queue's own configuration (e.g. a dead-letter policy).
//!
//! Shutdown is cooperative: [`QueueConsumer::stop`] sets a flag that the loop
//! samples once per iteration, so stopping provides no bound shorter than the
//! current poll wait plus the remainder of the in-flight batch.

use crate::codec::{DecodedMessage, JsonCodec};
use crate::config::ConsumerConfig;
use crate::error::QueueError;
use crate::message::{QueueAddress, RawMessage};
use crate::transport::QueueTransport;
use async_trait::async_trait;
use chrono::Duration;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

#[cfg(test)]
#[path = "consumer_tests.rs"]
mod tests;

/// Business logic invoked for each decoded message.
///
/// Implementations must be idempotent with respect to the same logical
/// message: at-least-once delivery means a message may be handled again after
/// a release, or after a crash before acknowledgement.
#[async_trait]
pub trait MessageHandler<T>: Send + Sync {
    /// Process one decoded message; returning an error releases the message
    /// back to the queue for redelivery
    async fn handle(&self, message: T) -> Result<(), anyhow::Error>;
}

/// Long-running consumer for one queue and one message type
pub struct QueueConsumer<T> {
    config: ConsumerConfig,
    transport: Arc<dyn QueueTransport>,
    handler: Arc<dyn MessageHandler<T>>,
    shutdown: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    started: bool,
    task: Option<JoinHandle<Result<(), QueueError>>>,
    _message_type: PhantomData<fn() -> T>,
}

impl<T> QueueConsumer<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Create consumer; fails if the configuration is invalid
    pub fn new(
        config: ConsumerConfig,
        transport: Arc<dyn QueueTransport>,
        handler: Arc<dyn MessageHandler<T>>,
    ) -> Result<Self, QueueError> {
        config.validate()?;

        Ok(Self {
            config,
            transport,
            handler,
            shutdown: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            started: false,
            task: None,
            _message_type: PhantomData,
        })
    }

    /// Resolve the queue address and begin the poll loop on its own task.
    ///
    /// Returns as soon as the loop is spawned, without waiting for its first
    /// iteration. Resolution failure is fatal; there is no retry here. A
    /// consumer can be started once; a second call fails even after `stop`.
    pub async fn start(&mut self) -> Result<(), QueueError> {
        if self.started {
            return Err(QueueError::AlreadyStarted {
                queue_name: self.config.queue_name().as_str().to_string(),
            });
        }

        debug!(queue = %self.config.queue_name(), "resolving queue address");
        let address = self
            .transport
            .resolve_address(self.config.queue_name())
            .await?;
        debug!(queue = %self.config.queue_name(), address = %address, "queue address resolved");

        self.started = true;
        self.running.store(true, Ordering::SeqCst);

        let task = tokio::spawn(poll_loop(
            self.config.clone(),
            address,
            Arc::clone(&self.transport),
            Arc::clone(&self.handler),
            Arc::clone(&self.shutdown),
            Arc::clone(&self.running),
        ));
        self.task = Some(task);

        Ok(())
    }

    /// Request shutdown and return immediately.
    ///
    /// The loop observes the flag at the top of its next iteration; it does
    /// not abandon a batch or a handler call already in progress.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Wait for the loop to exit and surface its outcome.
    ///
    /// Returns the fatal loop error if a batch receive failed, `Ok` after a
    /// clean shutdown.
    pub async fn join(&mut self) -> Result<(), QueueError> {
        let Some(task) = self.task.take() else {
            return Err(QueueError::NotStarted);
        };

        task.await.map_err(|cause| QueueError::LoopAborted {
            message: cause.to_string(),
        })?
    }

    /// Check whether the poll loop is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Check whether shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

/// Poll loop: runs until the shutdown flag is observed, or a batch receive
/// fails. Receive failures are fatal to the loop and surface through
/// [`QueueConsumer::join`].
async fn poll_loop<T>(
    config: ConsumerConfig,
    address: QueueAddress,
    transport: Arc<dyn QueueTransport>,
    handler: Arc<dyn MessageHandler<T>>,
    shutdown: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
) -> Result<(), QueueError>
where
    T: DeserializeOwned + Send + 'static,
{
    debug!(queue = %config.queue_name(), "consumer loop started");

    let result = loop {
        // Sampled once per iteration only; never mid-batch
        if shutdown.load(Ordering::SeqCst) {
            break Ok(());
        }

        let batch = match transport
            .receive(
                &address,
                config.max_batch_size(),
                config.poll_wait(),
                config.visibility_timeout(),
            )
            .await
        {
            Ok(batch) => batch,
            Err(cause) => {
                error!(queue = %config.queue_name(), error = %cause, "batch receive failed; stopping consumer loop");
                break Err(cause);
            }
        };

        if batch.is_empty() {
            debug!(queue = %config.queue_name(), "no messages received");
            continue;
        }

        debug!(queue = %config.queue_name(), count = batch.len(), "received messages");
        for raw in batch {
            process_message(&address, transport.as_ref(), handler.as_ref(), raw).await;
        }
    };

    debug!(queue = %config.queue_name(), "consumer loop shutting down");
    running.store(false, Ordering::SeqCst);

    result
}

/// Resolve one message to its terminal action: delete on success or on a
/// malformed body, release on handler failure. Acknowledgement failures after
/// the handler ran are logged, with no compensating action; redelivery is then
/// controlled by the queue.
async fn process_message<T>(
    address: &QueueAddress,
    transport: &dyn QueueTransport,
    handler: &dyn MessageHandler<T>,
    raw: RawMessage,
) where
    T: DeserializeOwned + Send + 'static,
{
    debug!(message_id = %raw.message_id, "processing message");

    let value = match JsonCodec::decode::<T>(&raw.body) {
        DecodedMessage::Decoded(value) => value,
        DecodedMessage::Malformed(cause) => {
            error!(message_id = %raw.message_id, error = %cause, "message body failed to decode; deleting poison message");
            if let Err(delete_error) = transport.delete(address, &raw.receipt_token).await {
                error!(message_id = %raw.message_id, error = %delete_error, "failed to delete malformed message");
            }
            return;
        }
    };

    match handler.handle(value).await {
        Ok(()) => {
            if let Err(delete_error) = transport.delete(address, &raw.receipt_token).await {
                warn!(message_id = %raw.message_id, error = %delete_error, "failed to delete handled message; it may be redelivered");
            }
        }
        Err(cause) => {
            debug!(message_id = %raw.message_id, error = %cause, "handler failed; releasing message for redelivery");
            if let Err(release_error) = transport
                .change_visibility(address, &raw.receipt_token, Duration::zero())
                .await
            {
                warn!(message_id = %raw.message_id, error = %release_error, "failed to release message");
            }
        }
    }
}
