//! Payload marshalling: pluggable encode/decode capabilities keyed by MIME
//! type. A JSON marshaller is registered at construction, before any user
//! registration can run, so a baseline always exists unless explicitly
//! replaced.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::endpoint::PayloadShape;

/// Canonical MIME type handled by the default marshaller.
pub const APPLICATION_JSON: &str = "application/json";

/// Error raised while encoding or decoding a payload.
#[derive(Debug)]
pub enum MarshalError {
    Encode { detail: String },
    Decode { detail: String },
    /// The decoded value does not match the endpoint's declared shape.
    ShapeMismatch { expected: PayloadShape },
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarshalError::Encode { detail } => write!(f, "failed to encode payload: {}", detail),
            MarshalError::Decode { detail } => write!(f, "failed to decode payload: {}", detail),
            MarshalError::ShapeMismatch { expected } => {
                write!(f, "decoded payload does not match declared {} shape", expected)
            }
        }
    }
}

impl std::error::Error for MarshalError {}

/// Encode/decode capability for one payload MIME type.
pub trait Marshaller: Send + Sync {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, MarshalError>;

    /// Decode bytes into a value, enforcing the declared payload shape:
    /// `List` requires a JSON array, `Map` a JSON object.
    fn decode(&self, bytes: &[u8], shape: PayloadShape) -> Result<Value, MarshalError>;
}

/// The built-in JSON marshaller.
pub struct JsonMarshaller;

impl Marshaller for JsonMarshaller {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, MarshalError> {
        serde_json::to_vec(value).map_err(|e| MarshalError::Encode {
            detail: e.to_string(),
        })
    }

    fn decode(&self, bytes: &[u8], shape: PayloadShape) -> Result<Value, MarshalError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| MarshalError::Decode {
            detail: e.to_string(),
        })?;
        match shape {
            PayloadShape::List if !value.is_array() => {
                Err(MarshalError::ShapeMismatch { expected: shape })
            }
            PayloadShape::Map if !value.is_object() => {
                Err(MarshalError::ShapeMismatch { expected: shape })
            }
            _ => Ok(value),
        }
    }
}

/// Registry mapping MIME type to marshaller capability.
///
/// Registration is last-write-wins: re-registering a MIME type replaces the
/// previous capability. Populated during the registration phase and read-only
/// while serving.
pub struct MarshallerRegistry {
    by_mime: HashMap<String, Arc<dyn Marshaller>>,
}

impl MarshallerRegistry {
    /// Create a registry with the JSON marshaller pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let mut by_mime: HashMap<String, Arc<dyn Marshaller>> = HashMap::new();
        by_mime.insert(APPLICATION_JSON.to_string(), Arc::new(JsonMarshaller));
        Self { by_mime }
    }

    pub fn register(&mut self, mime: &str, marshaller: Arc<dyn Marshaller>) {
        let replaced = self
            .by_mime
            .insert(mime.to_string(), marshaller)
            .is_some();
        debug!(mime = mime, replaced = replaced, "Marshaller registered");
    }

    #[must_use]
    pub fn get(&self, mime: &str) -> Option<Arc<dyn Marshaller>> {
        self.by_mime.get(mime).cloned()
    }

    /// Look up a marshaller, falling back to the JSON default.
    #[must_use]
    pub fn get_or_json(&self, mime: &str) -> Arc<dyn Marshaller> {
        self.get(mime)
            .or_else(|| self.get(APPLICATION_JSON))
            .unwrap_or_else(|| Arc::new(JsonMarshaller))
    }
}

impl Default for MarshallerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
