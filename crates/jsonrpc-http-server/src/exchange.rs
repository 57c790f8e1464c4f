//! One HTTP request/response cycle as a JSON-RPC [`Exchange`].

use async_trait::async_trait;
use bytes::Bytes;
use http_body::Body;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::{Map, Value};

use jsonrpc_server_core::{Exchange, JsonRpcTransportError};

/// Wraps an incoming HTTP body; the dispatcher reads it and leaves the
/// response here for the router to turn into an HTTP response.
pub struct HttpExchange<B> {
    body: Option<B>,
    max_body_size: usize,
    description: String,
    context: Map<String, Value>,
    response: Option<(u16, Vec<u8>)>,
}

impl<B> HttpExchange<B> {
    pub fn new(body: B, max_body_size: usize, description: String) -> Self {
        Self {
            body: Some(body),
            max_body_size,
            description,
            context: Map::new(),
            response: None,
        }
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// The status code and body written by the dispatcher
    pub fn into_response(self) -> Option<(u16, Vec<u8>)> {
        self.response
    }
}

#[async_trait]
impl<B> Exchange for HttpExchange<B>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    async fn read_request_bytes(&mut self) -> Result<Vec<u8>, JsonRpcTransportError> {
        let body = self.body.take().ok_or_else(|| {
            JsonRpcTransportError::ProtocolError("request body already consumed".to_string())
        })?;

        match Limited::new(body, self.max_body_size).collect().await {
            Ok(collected) => Ok(collected.to_bytes().to_vec()),
            Err(err) if err.is::<LengthLimitError>() => {
                Err(JsonRpcTransportError::PayloadTooLarge(self.max_body_size))
            }
            Err(err) => Err(JsonRpcTransportError::ProtocolError(format!(
                "failed to read request body: {}",
                err
            ))),
        }
    }

    async fn write_response(
        &mut self,
        code: u16,
        body: Vec<u8>,
    ) -> Result<(), JsonRpcTransportError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    #[tokio::test]
    async fn test_reads_body_once() {
        let mut exchange = HttpExchange::new(
            Full::new(Bytes::from_static(b"[1]")),
            1024,
            "<POST /jsonrpc HTTP/1.1>".to_string(),
        );
        assert_eq!(exchange.read_request_bytes().await.unwrap(), b"[1]".to_vec());
        assert!(matches!(
            exchange.read_request_bytes().await,
            Err(JsonRpcTransportError::ProtocolError(_))
        ));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut exchange = HttpExchange::new(
            Full::new(Bytes::from(vec![b' '; 64])),
            16,
            "<POST /jsonrpc HTTP/1.1>".to_string(),
        );
        assert!(matches!(
            exchange.read_request_bytes().await,
            Err(JsonRpcTransportError::PayloadTooLarge(16))
        ));
    }
}
