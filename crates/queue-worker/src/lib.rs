//! # Queue Worker
//!
//! Generic queue consumer and sender runtime with an at-least-once delivery
//! contract.
//!
//! This library provides:
//! - A long-running, generic [`QueueConsumer`] driving the
//!   poll/decode/dispatch/acknowledge loop for one queue and one message type
//! - A [`QueueSender`] that resolves its queue once and then publishes
//!   JSON-encoded messages
//! - A [`JsonCodec`] whose decode step is total, so malformed payloads surface
//!   as a distinct outcome instead of an error
//! - A [`QueueTransport`] trait for the underlying queue service, with an
//!   in-memory implementation for tests and development
//!
//! Each consumer owns exactly one loop on its own tokio task; multiple
//! consumers run fully independently in the same process with no shared
//! mutable state. Application code supplies a [`MessageHandler`] per consumer;
//! handlers must be idempotent since a released or unacknowledged message will
//! be redelivered.
//!
//! ## Module Organization
//!
//! - [`error`] - Error types for all queue operations
//! - [`message`] - Identifiers, addresses, receipt tokens, raw messages
//! - [`config`] - Consumer configuration
//! - [`codec`] - JSON codec and decode outcomes
//! - [`transport`] - Transport trait consumed by consumers and senders
//! - [`consumer`] - Handler trait and consumer loop
//! - [`sender`] - Message publisher
//! - [`providers`] - Transport implementations (in-memory)

// Module declarations
pub mod codec;
pub mod config;
pub mod consumer;
pub mod error;
pub mod message;
pub mod providers;
pub mod sender;
pub mod transport;

// Re-export commonly used types at crate root for convenience
pub use codec::{DecodedMessage, JsonCodec};
pub use config::{ConsumerConfig, MAX_BATCH_SIZE_LIMIT, MAX_VISIBILITY_TIMEOUT_HOURS};
pub use consumer::{MessageHandler, QueueConsumer};
pub use error::{CodecError, QueueError, ValidationError};
pub use message::{MessageId, QueueAddress, QueueName, RawMessage, ReceiptToken};
pub use providers::InMemoryTransport;
pub use sender::QueueSender;
pub use transport::QueueTransport;
