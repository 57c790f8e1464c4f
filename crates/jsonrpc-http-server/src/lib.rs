//! # HTTP JSON-RPC Server
//!
//! This crate hosts a [`JsonRpcDispatcher`] behind a plain HTTP/1.1 endpoint.
//! Each POST to the configured path is one exchange: the body is handed to the
//! dispatcher, and the encoded payload comes back with the status code chosen
//! by the dispatcher's [`ServerEvents`](jsonrpc_server_core::ServerEvents).
//!
//! ## Features
//! - Single-path routing with 404/405 for everything else
//! - Request body size limit (413 when exceeded)
//! - CORS headers and preflight for browser-based clients
//! - Optional peer address injection into every call's context

pub mod cors;
pub mod exchange;
pub mod server;

#[cfg(test)]
mod tests;

// Re-export main types
pub use cors::CorsLayer;
pub use exchange::HttpExchange;
pub use server::{HttpJsonRpcServer, HttpJsonRpcServerBuilder, ServerConfig, handle_request};

// Re-export foundational types
pub use jsonrpc_server_core::{JsonRpcDispatcher, MethodRegistry, ServerEvents};

/// Result type for HTTP server operations
pub type Result<T> = std::result::Result<T, HttpServerError>;

/// HTTP server errors
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
