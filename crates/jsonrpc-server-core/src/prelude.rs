//! # JSON-RPC Server Prelude
//!
//! This module provides convenient re-exports of the most commonly used types
//! from the JSON-RPC server library.
//!
//! ```rust
//! use jsonrpc_server_core::prelude::*;
//! ```

// Core JSON-RPC types
pub use crate::codec::{JsonEquivalent, RpcValue};
pub use crate::dispatch::JsonRpcDispatcher;
pub use crate::error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, MethodError};
pub use crate::hooks::{DefaultServerEvents, ServerEvents};
pub use crate::params::{ParamShape, Params};
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::resolver::{MethodHandler, MethodRegistry, MethodResolver, MethodResult, handler_fn};
pub use crate::response::{JsonRpcResponse, ResponseEnvelope, ResponseOutcome};
pub use crate::transport::{Exchange, MemoryExchange};
pub use crate::types::{JsonRpcVersion, RequestId};

// Standard error codes
pub use crate::error_codes::*;
