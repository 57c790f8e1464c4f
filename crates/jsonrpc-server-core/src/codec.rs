//! JSON text codec and the JSON-equivalent projection for application objects.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::error::JsonRpcError;

/// Errors raised while turning values into JSON text
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("JSON projection failed: {0}")]
    Projection(String),
}

/// Capability of an application object to present itself as JSON.
///
/// Types that are not natively JSON (handles, domain records, anything without
/// a `Serialize` impl) implement this and are wrapped with
/// [`RpcValue::custom`]. The encoder calls [`JsonEquivalent::json_equivalent`]
/// when it reaches such a value.
pub trait JsonEquivalent: Send + Sync {
    fn json_equivalent(&self) -> Result<Value, CodecError>;
}

/// A method result: either plain JSON or an object with a JSON projection.
#[derive(Clone)]
pub enum RpcValue {
    Json(Value),
    Custom(Arc<dyn JsonEquivalent>),
}

impl RpcValue {
    pub fn custom<T>(value: T) -> Self
    where
        T: JsonEquivalent + 'static,
    {
        RpcValue::Custom(Arc::new(value))
    }

    /// Resolve the value to plain JSON, running the projection if needed.
    pub fn to_json(&self) -> Result<Value, CodecError> {
        match self {
            RpcValue::Json(value) => Ok(value.clone()),
            RpcValue::Custom(object) => object.json_equivalent(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            RpcValue::Json(value) => Some(value),
            RpcValue::Custom(_) => None,
        }
    }
}

impl fmt::Debug for RpcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcValue::Json(value) => f.debug_tuple("Json").field(value).finish(),
            RpcValue::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq<Value> for RpcValue {
    fn eq(&self, other: &Value) -> bool {
        matches!(self.to_json(), Ok(ref value) if value == other)
    }
}

impl From<Value> for RpcValue {
    fn from(value: Value) -> Self {
        RpcValue::Json(value)
    }
}

impl From<()> for RpcValue {
    fn from(_: ()) -> Self {
        RpcValue::Json(Value::Null)
    }
}

impl Serialize for RpcValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RpcValue::Json(value) => value.serialize(serializer),
            RpcValue::Custom(object) => object
                .json_equivalent()
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
        }
    }
}

/// Decode raw bytes into a JSON value.
///
/// Malformed text and invalid UTF-8 both classify as a parse error with no id.
pub fn decode(bytes: &[u8]) -> Result<Value, JsonRpcError> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!("JSON decode failed: {}", e);
        JsonRpcError::parse_error()
    })
}

/// Encode any serializable value as compact JSON bytes.
pub fn encode<T>(value: &T) -> Result<Vec<u8>, CodecError>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_vec(value)?)
}
