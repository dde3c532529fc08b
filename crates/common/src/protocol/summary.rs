// NDJSON summary stream: event classification and incremental line decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error code for transport, body and decoding failures.
pub const INTERNAL: &str = "INTERNAL";
/// Error code for non-2xx responses.
pub const HTTP_ERROR: &str = "HTTP_ERROR";

/// Wire-level error carried by `{error: {code, message}}` events and reported
/// for transport failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct StreamError {
    pub code: String,
    pub message: String,
}

impl StreamError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL, message)
    }

    pub fn http(status: u16) -> Self {
        Self::new(HTTP_ERROR, format!("Failed to stream summary ({status})"))
    }
}

/// One decoded line of the summary stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Chunk(String),
    Done,
    Error(StreamError),
    /// Any other shape. Consumers skip these.
    Unknown(Value),
}

impl StreamEvent {
    /// Classify a decoded JSON value. Error events are checked first, then
    /// chunks, then `done: true`.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(fields) = &value else {
            return Self::Unknown(value);
        };

        if let Some(Value::Object(error)) = fields.get("error") {
            if let (Some(Value::String(code)), Some(Value::String(message))) =
                (error.get("code"), error.get("message"))
            {
                return Self::Error(StreamError::new(code.clone(), message.clone()));
            }
        }

        if let Some(Value::String(chunk)) = fields.get("chunk") {
            return Self::Chunk(chunk.clone());
        }

        if fields.get("done") == Some(&Value::Bool(true)) {
            return Self::Done;
        }

        Self::Unknown(value)
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON line: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<DecodeError> for StreamError {
    fn from(err: DecodeError) -> Self {
        StreamError::internal(err.to_string())
    }
}

/// Incremental newline-delimited JSON decoder.
///
/// Bytes are pushed as they arrive; complete lines are decoded on demand.
/// Blank lines are skipped. A trailing line without a newline is decoded by
/// [`NdjsonDecoder::finish`].
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Next complete line, or `None` when more bytes are needed.
    pub fn next_value(&mut self) -> Option<Result<Value, DecodeError>> {
        loop {
            let newline = self.buffer.iter().position(|byte| *byte == b'\n')?;
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(result) = decode_line(&line) {
                return Some(result);
            }
        }
    }

    /// Decode whatever remains once the body has ended.
    pub fn finish(&mut self) -> Option<Result<Value, DecodeError>> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }
}

fn decode_line(line: &[u8]) -> Option<Result<Value, DecodeError>> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return None;
    }
    Some(serde_json::from_slice(trimmed).map_err(DecodeError::from))
}
