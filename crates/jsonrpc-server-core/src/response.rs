use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::codec::{self, CodecError, RpcValue};
use crate::error::{JsonRpcError, JsonRpcErrorObject};
use crate::types::{JsonRpcVersion, RequestId};

/// Outcome carried by a response: exactly one of `result` or `error`.
#[derive(Debug, Clone)]
pub enum ResponseOutcome {
    Result(RpcValue),
    Error(JsonRpcErrorObject),
}

/// A JSON-RPC response
///
/// `id` is `None` when the originating request was a notification. Such a
/// response is never written out; when serialized on its own the id renders
/// as `null`.
#[derive(Debug, Clone)]
pub struct JsonRpcResponse {
    pub version: JsonRpcVersion,
    pub id: Option<RequestId>,
    pub outcome: ResponseOutcome,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RequestId>, result: impl Into<RpcValue>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            outcome: ResponseOutcome::Result(result.into()),
        }
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            outcome: ResponseOutcome::Error(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ResponseOutcome::Error(_))
    }

    pub fn result(&self) -> Option<&RpcValue> {
        match &self.outcome {
            ResponseOutcome::Result(value) => Some(value),
            ResponseOutcome::Error(_) => None,
        }
    }

    pub fn error_object(&self) -> Option<&JsonRpcErrorObject> {
        match &self.outcome {
            ResponseOutcome::Result(_) => None,
            ResponseOutcome::Error(error) => Some(error),
        }
    }

    /// Whether this response belongs in the output
    pub fn is_emittable(&self) -> bool {
        self.id.is_some()
    }
}

impl From<JsonRpcError> for JsonRpcResponse {
    fn from(err: JsonRpcError) -> Self {
        // Unknown ids are reported as an explicit null.
        JsonRpcResponse::error(Some(err.id.unwrap_or(RequestId::Null)), err.error)
    }
}

impl Serialize for JsonRpcResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("JsonRpcResponse", 3)?;
        state.serialize_field("jsonrpc", &self.version)?;
        state.serialize_field("id", self.id.as_ref().unwrap_or(&RequestId::Null))?;
        match &self.outcome {
            ResponseOutcome::Result(value) => state.serialize_field("result", value)?,
            ResponseOutcome::Error(error) => state.serialize_field("error", error)?,
        }
        state.end()
    }
}

/// Final payload of one exchange; mirrors the shape of the request envelope.
#[derive(Debug, Clone)]
pub enum ResponseEnvelope {
    /// Response to a non-batch request
    Single(JsonRpcResponse),
    /// Responses to a batch, notifications omitted
    Batch(Vec<JsonRpcResponse>),
    /// Nothing to send back: only notifications were processed
    Empty,
}

impl ResponseEnvelope {
    /// Assemble the payload from the collected responses.
    pub fn assemble(mut responses: Vec<JsonRpcResponse>, is_batch: bool) -> Self {
        if responses.is_empty() {
            ResponseEnvelope::Empty
        } else if is_batch {
            ResponseEnvelope::Batch(responses)
        } else {
            ResponseEnvelope::Single(responses.swap_remove(0))
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseEnvelope::Empty)
    }

    pub fn responses(&self) -> &[JsonRpcResponse] {
        match self {
            ResponseEnvelope::Single(response) => std::slice::from_ref(response),
            ResponseEnvelope::Batch(responses) => responses,
            ResponseEnvelope::Empty => &[],
        }
    }

    pub fn has_error(&self) -> bool {
        self.responses().iter().any(JsonRpcResponse::is_error)
    }

    /// Encode the payload; `Empty` encodes to no bytes at all.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            ResponseEnvelope::Single(response) => codec::encode(response),
            ResponseEnvelope::Batch(responses) => codec::encode(responses),
            ResponseEnvelope::Empty => Ok(Vec::new()),
        }
    }

    /// Convert to JSON text if there's a response to send
    pub fn to_json_string(&self) -> Option<Result<String, serde_json::Error>> {
        match self {
            ResponseEnvelope::Single(response) => Some(serde_json::to_string(response)),
            ResponseEnvelope::Batch(responses) => Some(serde_json::to_string(responses)),
            ResponseEnvelope::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn to_value(response: &JsonRpcResponse) -> Value {
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn test_success_shape() {
        let response = JsonRpcResponse::success(Some(RequestId::from("1")), json!("x"));
        assert_eq!(
            to_value(&response),
            json!({"jsonrpc": "2.0", "id": "1", "result": "x"})
        );
    }

    #[test]
    fn test_null_result_is_still_a_result() {
        let response = JsonRpcResponse::success(Some(RequestId::from(1)), ());
        let value = to_value(&response);
        assert!(value.as_object().unwrap().contains_key("result"));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_shape() {
        let response = JsonRpcResponse::error(
            Some(RequestId::from(7)),
            JsonRpcErrorObject::invalid_request(None),
        );
        assert_eq!(
            to_value(&response),
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "error": {"code": -32600, "message": "Invalid Request"}
            })
        );
    }

    #[test]
    fn test_from_classified_error_uses_null_id() {
        let response: JsonRpcResponse = JsonRpcError::parse_error().into();
        assert!(response.is_emittable());
        assert_eq!(to_value(&response)["id"], Value::Null);
        assert_eq!(response.error_object().unwrap().code, -32700);
    }

    #[test]
    fn test_assemble() {
        let ok = || JsonRpcResponse::success(Some(RequestId::from(1)), json!(1));

        assert!(ResponseEnvelope::assemble(vec![], true).is_empty());
        assert!(ResponseEnvelope::assemble(vec![], false).is_empty());
        assert!(matches!(
            ResponseEnvelope::assemble(vec![ok()], false),
            ResponseEnvelope::Single(_)
        ));
        match ResponseEnvelope::assemble(vec![ok()], true) {
            ResponseEnvelope::Batch(items) => assert_eq!(items.len(), 1),
            other => panic!("expected batch, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_json() {
        let batch = ResponseEnvelope::Batch(vec![
            JsonRpcResponse::success(Some(RequestId::from("1")), json!(3)),
            JsonRpcResponse::error(None, JsonRpcErrorObject::invalid_request(None)),
        ]);
        let text = batch.to_json_string().unwrap().unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed[1]["id"], Value::Null);
        assert!(batch.has_error());
        assert!(ResponseEnvelope::Empty.to_json_string().is_none());
    }
}
