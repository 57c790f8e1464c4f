//! # JSON-RPC 2.0 Server Engine
//!
//! A pure, transport-agnostic JSON-RPC 2.0 server implementation that follows the specification.
//! This crate decodes raw request bytes, validates each request, resolves and invokes
//! registered methods and assembles the response payload, without any transport-specific code.
//!
//! ## Features
//! - Single calls, notifications and batches with per-item failure isolation
//! - Explicit method registration table with declared argument shapes
//! - Embedder hooks for content pre-processing, response post-processing,
//!   status codes and logging
//! - Application objects with a JSON projection via [`JsonEquivalent`]
//!
//! ```rust
//! use jsonrpc_server_core::prelude::*;
//!
//! async fn echo(params: Params) -> MethodResult {
//!     Ok(params.arg::<serde_json::Value>("v")?.into())
//! }
//!
//! let registry = MethodRegistry::new()
//!     .register("echo", ParamShape::named(["v"]), handler_fn(echo));
//! let dispatcher = JsonRpcDispatcher::new(registry);
//! # let _ = dispatcher;
//! ```

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod hooks;
pub mod params;
pub mod request;
pub mod resolver;
pub mod response;
pub mod transport;
pub mod types;
pub mod validator;

pub mod prelude;

#[cfg(test)]
mod tests;

// Re-export main types
pub use codec::{CodecError, JsonEquivalent, RpcValue};
pub use dispatch::{DispatchOutcome, JsonRpcDispatcher};
pub use error::{
    JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, JsonRpcTransportError, MethodError,
    ToJsonRpcError,
};
pub use hooks::{DefaultServerEvents, ServerEvents};
pub use params::{ParamShape, Params};
pub use request::{JsonRpcRequest, RequestCandidate, RequestParams};
pub use resolver::{
    FunctionHandler, MethodDescriptor, MethodHandler, MethodRegistry, MethodResolver,
    MethodResult, ResolvedMethod, handler_fn,
};
pub use response::{JsonRpcResponse, ResponseEnvelope, ResponseOutcome};
pub use transport::{Exchange, MemoryExchange};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;

    /// Unclassified failure raised inside an application method
    pub const APPLICATION_ERROR: i64 = 0;
}
