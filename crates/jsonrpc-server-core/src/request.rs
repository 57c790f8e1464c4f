use serde_json::{Map, Value};

use crate::types::{JsonRpcVersion, RequestId};

/// Reserved key inside object params that carries positional arguments.
pub const POSITIONAL_ARGS_KEY: &str = "__args";

/// Parameters for a JSON-RPC request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestParams {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object
    Object(Map<String, Value>),
}

impl RequestParams {
    /// Split into positional and named arguments.
    ///
    /// Object params may carry positional arguments under `__args`; the
    /// validator guarantees that key holds an array.
    pub fn split(&self) -> (Vec<Value>, Map<String, Value>) {
        match self {
            RequestParams::Array(args) => (args.clone(), Map::new()),
            RequestParams::Object(map) => {
                let mut kwargs = map.clone();
                let args = match kwargs.remove(POSITIONAL_ARGS_KEY) {
                    Some(Value::Array(args)) => args,
                    _ => Vec::new(),
                };
                (args, kwargs)
            }
        }
    }
}

/// A decoded batch element that has not been validated yet.
///
/// Candidates are produced by [`JsonRpcRequest::from_json`] and turned into
/// requests by [`crate::validator::check`]; keeping the two steps apart lets a
/// batch reject one element without touching its siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestCandidate {
    raw: Value,
}

impl RequestCandidate {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The candidate's id, if it has one of the legal id types.
    pub fn id(&self) -> Option<RequestId> {
        self.raw.get("id").and_then(RequestId::from_value)
    }
}

/// A validated JSON-RPC request, built only by [`crate::validator::check`].
///
/// `id: None` means the member was absent, i.e. a notification. An explicit
/// `"id": null` is `Some(RequestId::Null)` and is answered like any call.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    pub version: JsonRpcVersion,
    pub id: Option<RequestId>,
    pub method: String,
    pub params: Option<RequestParams>,
    /// Any other members of the request object
    pub extra: Map<String, Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Positional and named arguments of this call
    pub fn arguments(&self) -> (Vec<Value>, Map<String, Value>) {
        self.params
            .as_ref()
            .map(RequestParams::split)
            .unwrap_or_default()
    }

    /// Turn decoded JSON into request candidates without validating them.
    ///
    /// A list yields one candidate per element; anything else yields exactly
    /// one candidate.
    pub fn from_json(content: Value) -> Vec<RequestCandidate> {
        match content {
            Value::Array(items) => items.into_iter().map(RequestCandidate::new).collect(),
            other => vec![RequestCandidate::new(other)],
        }
    }
}
