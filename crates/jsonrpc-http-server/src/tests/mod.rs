//! Test modules for jsonrpc-http-server
//!
//! Routing tests call [`crate::handle_request`] with in-memory bodies; the
//! end-to-end tests go through a real listener.


use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response};
use serde_json::{Value, json};

use jsonrpc_server_core::{
    JsonRpcDispatcher, MethodRegistry, MethodResult, ParamShape, Params, handler_fn,
};

async fn add(params: Params) -> MethodResult {
    let a: i64 = params.arg("a")?;
    let b: i64 = params.arg("b")?;
    Ok(json!(a + b).into())
}

async fn whoami(params: Params) -> MethodResult {
    Ok(params.arg::<Value>("peer")?.into())
}

pub(crate) fn registry() -> MethodRegistry {
    MethodRegistry::new()
        .register("add", ParamShape::named(["a", "b"]), handler_fn(add))
        .register("whoami", ParamShape::Any, handler_fn(whoami))
}

pub(crate) fn dispatcher() -> JsonRpcDispatcher {
    JsonRpcDispatcher::new(registry())
}

pub(crate) fn post(path: &str, body: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

pub(crate) async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}
