use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use thiserror::Error;

use crate::error_codes;

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError(i64), // -32099 to -32000
    /// Any failure raised by an application method that carries no
    /// protocol-level classification.
    Application,
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            JsonRpcErrorCode::ServerError(code) => *code,
            JsonRpcErrorCode::Application => error_codes::APPLICATION_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::ServerError(_) => "Server error",
            JsonRpcErrorCode::Application => "Application error",
        }
    }

    /// Classify a numeric code back into the taxonomy.
    pub fn from_code(code: i64) -> Self {
        match code {
            error_codes::PARSE_ERROR => JsonRpcErrorCode::ParseError,
            error_codes::INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            error_codes::METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            error_codes::INVALID_PARAMS => JsonRpcErrorCode::InvalidParams,
            error_codes::INTERNAL_ERROR => JsonRpcErrorCode::InternalError,
            c if (error_codes::SERVER_ERROR_START..=error_codes::SERVER_ERROR_END).contains(&c) => {
                JsonRpcErrorCode::ServerError(c)
            }
            _ => JsonRpcErrorCode::Application,
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorObject {
    pub fn new(code: JsonRpcErrorCode, message: Option<String>, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            data,
        }
    }

    pub fn parse_error(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::ParseError, None, data)
    }

    pub fn invalid_request(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest, None, data)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::MethodNotFound,
            None,
            Some(json!({ "method": method })),
        )
    }

    pub fn invalid_params(message: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::InvalidParams,
            None,
            Some(Value::String(message.to_string())),
        )
    }

    pub fn internal_error(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, message, None)
    }

    pub fn server_error(code: i64, message: &str, data: Option<Value>) -> Self {
        assert!(
            (error_codes::SERVER_ERROR_START..=error_codes::SERVER_ERROR_END).contains(&code),
            "Server error code must be in range -32099 to -32000"
        );
        Self::new(
            JsonRpcErrorCode::ServerError(code),
            Some(message.to_string()),
            data,
        )
    }

    /// Error code 0: an unclassified application failure. The failure's
    /// message becomes the error message and its details travel as `data`.
    pub fn application(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::Application, Some(message.into()), data)
    }

    pub fn kind(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }
}

impl fmt::Display for JsonRpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

/// A classified failure tied to the id of the call it belongs to.
///
/// This is what validation and top-level processing produce; the dispatcher
/// renders it into an error response.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcError {
    pub id: Option<crate::RequestId>,
    pub error: JsonRpcErrorObject,
}

impl JsonRpcError {
    pub fn new(id: Option<crate::RequestId>, error: JsonRpcErrorObject) -> Self {
        Self { id, error }
    }

    pub fn parse_error() -> Self {
        Self::new(None, JsonRpcErrorObject::parse_error(None))
    }

    pub fn invalid_request(id: Option<crate::RequestId>) -> Self {
        Self::new(id, JsonRpcErrorObject::invalid_request(None))
    }

    pub fn method_not_found(id: Option<crate::RequestId>, method: &str) -> Self {
        Self::new(id, JsonRpcErrorObject::method_not_found(method))
    }

    pub fn invalid_params(id: Option<crate::RequestId>, message: &str) -> Self {
        Self::new(id, JsonRpcErrorObject::invalid_params(message))
    }

    pub fn internal_error(id: Option<crate::RequestId>, message: Option<String>) -> Self {
        Self::new(id, JsonRpcErrorObject::internal_error(message))
    }

    pub fn code(&self) -> i64 {
        self.error.code
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JSON-RPC Error {}: {}",
            self.error.code, self.error.message
        )
    }
}

impl std::error::Error for JsonRpcError {}

/// Failure returned by an application method.
///
/// The dispatcher classifies every variant into a JSON-RPC error object, so no
/// handler failure leaves the engine unclassified.
#[derive(Debug, Error)]
pub enum MethodError {
    /// Wrong argument count, unknown/missing argument or wrong argument type.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// A handler that wants full control of the error object.
    #[error("{0}")]
    Rpc(JsonRpcErrorObject),

    /// Anything else; reported with code 0.
    #[error("{message}")]
    Application { message: String, data: Option<Value> },
}

impl MethodError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        MethodError::InvalidParams(message.into())
    }

    pub fn application(message: impl Into<String>) -> Self {
        MethodError::Application {
            message: message.into(),
            data: None,
        }
    }

    /// Wrap an arbitrary error, keeping its source chain as `data`.
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error,
    {
        let mut args = vec![Value::String(err.to_string())];
        let mut source = err.source();
        while let Some(cause) = source {
            args.push(Value::String(cause.to_string()));
            source = cause.source();
        }
        MethodError::Application {
            message: err.to_string(),
            data: Some(Value::Array(args)),
        }
    }
}

impl From<serde_json::Error> for MethodError {
    fn from(err: serde_json::Error) -> Self {
        MethodError::InvalidParams(err.to_string())
    }
}

impl From<JsonRpcErrorObject> for MethodError {
    fn from(error: JsonRpcErrorObject) -> Self {
        MethodError::Rpc(error)
    }
}

/// Trait for errors that can be converted to JSON-RPC error objects
pub trait ToJsonRpcError {
    /// Convert this error to a JSON-RPC error object
    fn to_error_object(&self) -> JsonRpcErrorObject;
}

impl ToJsonRpcError for MethodError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            MethodError::InvalidParams(message) => JsonRpcErrorObject::invalid_params(message),
            MethodError::Rpc(error) => error.clone(),
            MethodError::Application { message, data } => {
                JsonRpcErrorObject::application(message.clone(), data.clone())
            }
        }
    }
}

impl ToJsonRpcError for JsonRpcError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        self.error.clone()
    }
}

/// Transport-level errors for JSON-RPC processing (no domain logic)
#[derive(Debug, Error)]
pub enum JsonRpcTransportError {
    #[error("JSON encode error: {0}")]
    JsonEncodeError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    CodecError(#[from] crate::codec::CodecError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Protocol error: {0}")]
    ProtocolError(String),
}
