//! Embedder hooks called by the dispatcher.

use serde_json::Value;
use tracing::{debug, warn};

use crate::response::{JsonRpcResponse, ResponseEnvelope};

/// Status code reported for every exchange unless an embedder overrides
/// [`ServerEvents::response_code`].
pub const DEFAULT_RESPONSE_CODE: u16 = 200;

/// Customization points of the dispatcher. Every method has a default, so an
/// embedder only overrides what it needs.
pub trait ServerEvents: Send + Sync {
    /// Rewrite the freshly decoded items before they become requests.
    /// Receives the normalised list (a non-batch call is a one-element list).
    fn process_content(&self, content: Vec<Value>) -> Vec<Value> {
        content
    }

    /// Adjust a successful response before it is collected. Clearing the id
    /// drops the response from the output.
    fn process_response(&self, response: JsonRpcResponse) -> JsonRpcResponse {
        response
    }

    /// Transport status code for the final payload.
    ///
    /// Clients read the JSON-RPC error body, so the default reports success
    /// even when the payload carries errors.
    fn response_code(&self, envelope: &ResponseEnvelope) -> u16 {
        let _ = envelope;
        DEFAULT_RESPONSE_CODE
    }

    /// Record the outcome of one exchange.
    fn log(&self, envelope: &ResponseEnvelope, request: &str, had_error: bool) {
        let count = envelope.responses().len();
        if had_error {
            warn!("{} answered with errors ({} responses)", request, count);
        } else {
            debug!("{} answered ({} responses)", request, count);
        }
    }
}

/// Hooks with every default in place
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultServerEvents;

impl ServerEvents for DefaultServerEvents {}
