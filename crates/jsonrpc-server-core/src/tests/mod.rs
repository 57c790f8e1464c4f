//! Test modules for the dispatcher
//!
//! Scenario tests drive whole transmissions through [`crate::JsonRpcDispatcher`]
//! and inspect the decoded payload.


use serde_json::{Map, Value, json};

use crate::codec::{CodecError, JsonEquivalent};
use crate::{
    JsonRpcDispatcher, MethodError, MethodRegistry, MethodResult, ParamShape, Params,
    ResponseEnvelope, RpcValue, handler_fn,
};

async fn add(params: Params) -> MethodResult {
    let a: i64 = params.arg("a")?;
    let b: i64 = params.arg("b")?;
    Ok(json!(a + b).into())
}

async fn subtract(params: Params) -> MethodResult {
    let a: i64 = params.arg("a")?;
    let b: i64 = params.arg("b")?;
    Ok(json!(a - b).into())
}

async fn echo(params: Params) -> MethodResult {
    Ok(params.arg::<Value>("v")?.into())
}

async fn fail(_params: Params) -> MethodResult {
    Err(MethodError::from_error(std::io::Error::other("backend unavailable")))
}

/// An application object whose JSON projection always fails
pub(crate) struct Unprojectable;

impl JsonEquivalent for Unprojectable {
    fn json_equivalent(&self) -> Result<Value, CodecError> {
        Err(CodecError::Projection("cannot project".to_string()))
    }
}

async fn broken(_params: Params) -> MethodResult {
    Ok(RpcValue::custom(Unprojectable))
}

async fn context_keys(params: Params) -> MethodResult {
    let keys: Vec<&String> = params.kwargs().keys().collect();
    Ok(json!(keys).into())
}

/// Registry with the example methods used throughout the scenario tests
pub(crate) fn calculator_registry() -> MethodRegistry {
    MethodRegistry::new()
        .register("add", ParamShape::named(["a", "b"]), handler_fn(add))
        .register("subtract", ParamShape::named(["a", "b"]), handler_fn(subtract))
        .register("echo", ParamShape::named(["v"]), handler_fn(echo))
        .register("fail", ParamShape::Any, handler_fn(fail))
        .register("broken", ParamShape::Any, handler_fn(broken))
        .register("context_keys", ParamShape::Any, handler_fn(context_keys))
}

pub(crate) fn dispatcher() -> JsonRpcDispatcher {
    JsonRpcDispatcher::new(calculator_registry())
}

/// Dispatch a transmission without transport context and decode the payload.
/// `None` means the exchange produced no body.
pub(crate) async fn dispatch_json(dispatcher: &JsonRpcDispatcher, body: &str) -> Option<Value> {
    let outcome = dispatcher.handle_bytes(body.as_bytes(), &Map::new()).await;
    decode_envelope(&outcome.envelope)
}

pub(crate) fn decode_envelope(envelope: &ResponseEnvelope) -> Option<Value> {
    let bytes = envelope.to_bytes().expect("envelope encodes");
    if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).expect("payload is JSON"))
    }
}
