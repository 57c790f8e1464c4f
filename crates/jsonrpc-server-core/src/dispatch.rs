//! The dispatcher: decode → validate → resolve → invoke → assemble.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::codec;
use crate::error::{
    JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, JsonRpcTransportError, ToJsonRpcError,
};
use crate::hooks::{DefaultServerEvents, ServerEvents};
use crate::request::JsonRpcRequest;
use crate::resolver::MethodResolver;
use crate::response::{JsonRpcResponse, ResponseEnvelope};
use crate::transport::Exchange;
use crate::types::RequestId;
use crate::validator;

/// Result of processing one transmission
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub envelope: ResponseEnvelope,
    /// Whether any item failed
    pub had_error: bool,
}

/// JSON-RPC 2.0 dispatcher.
///
/// Holds no per-exchange state; one instance can serve any number of
/// concurrent exchanges behind an `Arc`.
#[derive(Clone)]
pub struct JsonRpcDispatcher {
    resolver: Arc<dyn MethodResolver>,
    events: Arc<dyn ServerEvents>,
}

impl JsonRpcDispatcher {
    pub fn new<R>(resolver: R) -> Self
    where
        R: MethodResolver + 'static,
    {
        Self {
            resolver: Arc::new(resolver),
            events: Arc::new(DefaultServerEvents),
        }
    }

    pub fn from_parts(resolver: Arc<dyn MethodResolver>, events: Arc<dyn ServerEvents>) -> Self {
        Self { resolver, events }
    }

    /// Install embedder hooks
    pub fn with_events<E>(mut self, events: E) -> Self
    where
        E: ServerEvents + 'static,
    {
        self.events = Arc::new(events);
        self
    }

    pub fn events(&self) -> &dyn ServerEvents {
        self.events.as_ref()
    }

    /// Run one full exchange: read, dispatch, pick the status code, log,
    /// encode and write.
    pub async fn serve<X>(&self, exchange: &mut X) -> Result<ResponseEnvelope, JsonRpcTransportError>
    where
        X: Exchange + ?Sized,
    {
        let description = exchange.describe();
        let body = exchange.read_request_bytes().await?;
        let context = exchange.context();

        let DispatchOutcome {
            mut envelope,
            mut had_error,
        } = self.handle_bytes(&body, &context).await;

        let bytes = match envelope.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to encode response for {}: {}", description, e);
                envelope = ResponseEnvelope::Single(
                    JsonRpcError::internal_error(None, Some(e.to_string())).into(),
                );
                had_error = true;
                envelope.to_bytes()?
            }
        };

        let code = self.events.response_code(&envelope);
        self.events.log(&envelope, &description, had_error);
        exchange.write_response(code, bytes).await?;
        Ok(envelope)
    }

    /// Dispatch a raw transmission. Always produces an outcome: anything that
    /// escapes per-item handling becomes a single error response.
    pub async fn handle_bytes(&self, body: &[u8], context: &Map<String, Value>) -> DispatchOutcome {
        match self.process(body, context).await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!("Top-level JSON-RPC error: {}", err);
                DispatchOutcome {
                    envelope: ResponseEnvelope::Single(Self::render_error(err.error, err.id)),
                    had_error: true,
                }
            }
        }
    }

    /// Build an error response; an unknown id renders as `null`.
    pub fn render_error(error: JsonRpcErrorObject, id: Option<RequestId>) -> JsonRpcResponse {
        JsonRpcResponse::error(Some(id.unwrap_or(RequestId::Null)), error)
    }

    async fn process(
        &self,
        body: &[u8],
        context: &Map<String, Value>,
    ) -> Result<DispatchOutcome, JsonRpcError> {
        let content = codec::decode(body)?;

        let is_batch = content.is_array();
        let items = match content {
            Value::Array(items) => items,
            other => vec![other],
        };
        if items.is_empty() {
            return Err(JsonRpcError::invalid_request(None));
        }

        let items = self.events.process_content(items);

        // Validate everything before invoking anything. A single request
        // fails as a whole; a batch keeps the failure in place.
        let mut checked = Vec::with_capacity(items.len());
        for candidate in JsonRpcRequest::from_json(Value::Array(items)) {
            match validator::check(&candidate) {
                Ok(request) => checked.push(Ok(request)),
                Err(err) if is_batch => {
                    debug!("Rejected batch item: {}", err);
                    checked.push(Err(err));
                }
                Err(err) => return Err(err),
            }
        }

        let mut had_error = false;
        let mut responses = Vec::with_capacity(checked.len());
        for item in checked {
            match item {
                Ok(request) => match self.dispatch_request(&request, context).await {
                    Ok(response) => {
                        let response = self.events.process_response(response);
                        if response.is_emittable() {
                            responses.push(response);
                        }
                    }
                    Err(error) => {
                        // A failed notification still answers, with a null id.
                        had_error = true;
                        debug!("Method '{}' failed: {}", request.method, error);
                        responses.push(Self::render_error(error, request.id.clone()));
                    }
                },
                Err(err) => {
                    had_error = true;
                    responses.push(Self::render_error(err.error, err.id));
                }
            }
        }

        Ok(DispatchOutcome {
            envelope: ResponseEnvelope::assemble(responses, is_batch),
            had_error,
        })
    }

    /// Resolve and invoke one validated request.
    pub async fn dispatch_request(
        &self,
        request: &JsonRpcRequest,
        context: &Map<String, Value>,
    ) -> Result<JsonRpcResponse, JsonRpcErrorObject> {
        let (args, kwargs) = request.arguments();

        // Transport context wins over request extras.
        let mut call_context = request.extra.clone();
        call_context.extend(context.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut lookup_kwargs = call_context.clone();
        lookup_kwargs.extend(kwargs.iter().map(|(k, v)| (k.clone(), v.clone())));

        let resolved = self
            .resolver
            .find_method(&request.method, &args, &lookup_kwargs)
            .ok_or_else(|| JsonRpcErrorObject::method_not_found(&request.method))?;
        let method = &resolved.descriptor;

        debug!("Dispatching '{}' (id: {:?})", request.method, request.id);

        let params = method
            .shape
            .bind(args, kwargs, call_context)
            .map_err(|e| e.to_error_object())?;

        let result = if resolved.postprocess {
            let raw = method
                .handler
                .call(params.clone())
                .await
                .map_err(|e| e.to_error_object())?;
            self.resolver
                .postprocess(method, raw, &params)
                .map_err(|e| e.to_error_object())?
        } else {
            method
                .handler
                .call(params)
                .await
                .map_err(|e| e.to_error_object())?
        };

        // Project custom results here so a failure stays with this item.
        let result = result
            .to_json()
            .map_err(|e| {
                JsonRpcErrorObject::new(
                    JsonRpcErrorCode::InternalError,
                    None,
                    Some(Value::String(e.to_string())),
                )
            })?;

        Ok(JsonRpcResponse::success(request.id.clone(), result))
    }
}

impl std::fmt::Debug for JsonRpcDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcDispatcher").finish_non_exhaustive()
    }
}
