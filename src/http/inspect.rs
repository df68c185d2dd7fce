//! Body inspection: read, decode, replay.
//!
//! # Responsibilities
//! - Buffer a single-pass body stream into owned bytes
//! - Decode the bytes as a JSON object for logging
//! - Hand back a fresh body over the exact same bytes
//!
//! # Design Decisions
//! - Only read failures are errors; a body that is not a JSON object is
//!   still replayed, with the decode failure kept alongside the bytes
//! - Buffering is bounded by a configured limit

use axum::body::{Body, Bytes};
use http_body_util::BodyExt;
use hyper::body::Body as HttpBody;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;
use std::pin::pin;
use thiserror::Error;

/// A decoded JSON object body.
pub type JsonObject = Map<String, Value>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The body stream could not be read to completion.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The underlying stream failed. `partial` holds what was read before it did.
    #[error("failed to read body: {source}")]
    Read { partial: Bytes, source: BoxError },

    /// The body is larger than the buffering limit.
    #[error("body exceeds limit of {limit} bytes")]
    TooLarge { limit: usize },
}

/// Why a fully read body was not logged as a JSON object.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("body is empty")]
    Empty,

    #[error("body is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("body is a JSON {0}, not an object")]
    NotObject(&'static str),
}

/// A fully buffered body.
#[derive(Debug)]
pub struct Inspected {
    raw: Bytes,
    decoded: Result<JsonObject, DecodeError>,
}

impl Inspected {
    /// Decode already buffered bytes.
    pub fn new(raw: Bytes) -> Self {
        let decoded = decode_object(&raw);
        Self { raw, decoded }
    }

    /// The bytes exactly as read off the wire.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn object(&self) -> Option<&JsonObject> {
        self.decoded.as_ref().ok()
    }

    pub fn decode_error(&self) -> Option<&DecodeError> {
        self.decoded.as_ref().err()
    }

    /// A fresh body over the buffered bytes.
    pub fn replay(&self) -> Body {
        Body::from(self.raw.clone())
    }

    /// Value for the `body` log field.
    pub fn logged_body(&self) -> LoggedBody<'_> {
        match &self.decoded {
            Ok(object) => LoggedBody::Object(object),
            Err(_) => LoggedBody::Raw(String::from_utf8_lossy(&self.raw)),
        }
    }
}

/// Renders a body for a log record: compact JSON for objects, text otherwise.
#[derive(Debug)]
pub enum LoggedBody<'a> {
    Object(&'a JsonObject),
    Raw(Cow<'a, str>),
}

impl fmt::Display for LoggedBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggedBody::Object(object) => {
                let json = serde_json::to_string(object).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            LoggedBody::Raw(text) => f.write_str(text),
        }
    }
}

/// Read `body` to the end, then decode it.
///
/// Trailers are dropped. On success the original stream is exhausted and the
/// caller must forward [`Inspected::replay`] in its place.
pub async fn inspect<B>(body: B, limit: usize) -> Result<Inspected, InspectError>
where
    B: HttpBody<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if body.size_hint().lower() > limit as u64 {
        return Err(InspectError::TooLarge { limit });
    }

    let mut body = pin!(body);
    let mut buf = Vec::with_capacity(body.size_hint().lower() as usize);

    while let Some(frame) = body.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                return Err(InspectError::Read {
                    partial: Bytes::from(buf),
                    source: e.into(),
                });
            }
        };
        if let Ok(data) = frame.into_data() {
            if buf.len() + data.len() > limit {
                return Err(InspectError::TooLarge { limit });
            }
            buf.extend_from_slice(&data);
        }
    }

    Ok(Inspected::new(Bytes::from(buf)))
}

fn decode_object(raw: &[u8]) -> Result<JsonObject, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::Empty);
    }
    match serde_json::from_slice(raw)? {
        Value::Object(object) => Ok(object),
        Value::Array(_) => Err(DecodeError::NotObject("array")),
        Value::String(_) => Err(DecodeError::NotObject("string")),
        Value::Number(_) => Err(DecodeError::NotObject("number")),
        Value::Bool(_) => Err(DecodeError::NotObject("boolean")),
        Value::Null => Err(DecodeError::NotObject("null")),
    }
}
