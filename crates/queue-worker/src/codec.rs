//! JSON message codec.
//!
//! Decoding is a total function: every failure is captured in the
//! [`DecodedMessage::Malformed`] variant so the consumer can apply its
//! delete-on-malformed policy uniformly. A payload either decodes to a complete
//! value or not at all; there are no partial results.

use crate::error::CodecError;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;

/// Outcome of decoding one message body
#[derive(Debug)]
pub enum DecodedMessage<T> {
    /// Body decoded to a complete value
    Decoded(T),
    /// Body can never be understood, on this delivery or any redelivery
    Malformed(CodecError),
}

impl<T> DecodedMessage<T> {
    /// Check if the body failed to decode
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// Codec for JSON text message bodies
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to its JSON wire representation
    pub fn encode<T: Serialize>(value: &T) -> Result<Bytes, CodecError> {
        let body = serde_json::to_vec(value)?;
        Ok(Bytes::from(body))
    }

    /// Decode a message body; never fails, all errors surface as `Malformed`
    pub fn decode<T: DeserializeOwned>(body: &[u8]) -> DecodedMessage<T> {
        let text = match std::str::from_utf8(body) {
            Ok(text) => text,
            Err(_) => return DecodedMessage::Malformed(CodecError::InvalidUtf8),
        };

        match serde_json::from_str(text) {
            Ok(value) => DecodedMessage::Decoded(value),
            Err(cause) => DecodedMessage::Malformed(CodecError::JsonError(cause)),
        }
    }
}
