//! The contract between the dispatcher and whatever carries the bytes.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::JsonRpcTransportError;

/// One request/response exchange as seen by the hosting transport.
#[async_trait]
pub trait Exchange: Send {
    /// Read the complete request body.
    async fn read_request_bytes(&mut self) -> Result<Vec<u8>, JsonRpcTransportError>;

    /// Write the status code and encoded payload. An empty body means there is
    /// nothing to send back.
    async fn write_response(
        &mut self,
        code: u16,
        body: Vec<u8>,
    ) -> Result<(), JsonRpcTransportError>;

    /// Human-readable description of the request, used for logging.
    fn describe(&self) -> String;

    /// Extra call context merged into every call's named arguments.
    fn context(&self) -> Map<String, Value> {
        Map::new()
    }
}

/// An in-memory exchange, for tests and for embedding the dispatcher behind
/// transports that already own their buffers.
#[derive(Debug, Clone, Default)]
pub struct MemoryExchange {
    request: Vec<u8>,
    description: String,
    context: Map<String, Value>,
    response: Option<(u16, Vec<u8>)>,
}

impl MemoryExchange {
    pub fn new(request: impl Into<Vec<u8>>) -> Self {
        Self {
            request: request.into(),
            description: "<memory>".to_string(),
            context: Map::new(),
            response: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Status code written by the dispatcher, if any
    pub fn code(&self) -> Option<u16> {
        self.response.as_ref().map(|(code, _)| *code)
    }

    /// Body written by the dispatcher, if any
    pub fn body(&self) -> Option<&[u8]> {
        self.response.as_ref().map(|(_, body)| body.as_slice())
    }
}

#[async_trait]
impl Exchange for MemoryExchange {
    async fn read_request_bytes(&mut self) -> Result<Vec<u8>, JsonRpcTransportError> {
        Ok(std::mem::take(&mut self.request))
    }

    async fn write_response(
        &mut self,
        code: u16,
        body: Vec<u8>,
    ) -> Result<(), JsonRpcTransportError> {
        if self.response.is_some() {
            return Err(JsonRpcTransportError::ProtocolError(
                "response already written".to_string(),
            ));
        }
        self.response = Some((code, body));
        Ok(())
    }

    fn describe(&self) -> String {
        self.description.clone()
    }

    fn context(&self) -> Map<String, Value> {
        self.context.clone()
    }
}
