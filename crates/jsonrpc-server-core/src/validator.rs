//! Shape validation for incoming request objects.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::JsonRpcError;
use crate::request::{JsonRpcRequest, POSITIONAL_ARGS_KEY, RequestCandidate, RequestParams};
use crate::types::JsonRpcVersion;

/// Validate a candidate and build the typed request from it.
///
/// Every failure is an Invalid Request error carrying the candidate's id when
/// that id is a legal scalar, `None` otherwise. The candidate itself is not
/// modified.
pub fn check(candidate: &RequestCandidate) -> Result<JsonRpcRequest, JsonRpcError> {
    let Value::Object(obj) = candidate.raw() else {
        return Err(JsonRpcError::invalid_request(None));
    };

    let id = candidate.id();
    if id.is_none() && obj.contains_key("id") {
        return Err(JsonRpcError::invalid_request(None));
    }
    let reject = || JsonRpcError::invalid_request(id.clone());

    let version = obj
        .get("jsonrpc")
        .and_then(|raw| JsonRpcVersion::deserialize(raw).ok())
        .ok_or_else(reject)?;

    let method = match obj.get("method") {
        Some(Value::String(m)) if !m.is_empty() => m.clone(),
        _ => return Err(reject()),
    };

    let params = match obj.get("params") {
        None => None,
        Some(Value::Array(args)) => Some(RequestParams::Array(args.clone())),
        Some(Value::Object(map)) => {
            if map
                .get(POSITIONAL_ARGS_KEY)
                .is_some_and(|args| !args.is_array())
            {
                return Err(reject());
            }
            Some(RequestParams::Object(map.clone()))
        }
        Some(_) => return Err(reject()),
    };

    let extra: Map<String, Value> = obj
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "jsonrpc" | "id" | "method" | "params"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(JsonRpcRequest {
        version,
        id,
        method,
        params,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestId;
    use serde_json::json;

    fn check_value(value: Value) -> Result<JsonRpcRequest, JsonRpcError> {
        check(&RequestCandidate::new(value))
    }

    #[test]
    fn test_valid_request() {
        let request = check_value(json!({
            "jsonrpc": "2.0", "method": "echo", "params": ["x"], "id": "1"
        }))
        .unwrap();
        assert_eq!(request.method, "echo");
        assert_eq!(request.id, Some(RequestId::from("1")));
        assert_eq!(request.params, Some(RequestParams::Array(vec![json!("x")])));
    }

    #[test]
    fn test_valid_notification() {
        let request = check_value(json!({"jsonrpc": "2.0", "method": "notify"})).unwrap();
        assert!(request.is_notification());
        assert!(request.params.is_none());
    }

    #[test]
    fn test_not_an_object() {
        for value in [json!(1), json!("x"), json!(null), json!([1])] {
            let err = check_value(value).unwrap_err();
            assert_eq!(err.code(), -32600);
            assert_eq!(err.id, None);
        }
    }

    #[test]
    fn test_wrong_version_keeps_id() {
        let err = check_value(json!({"jsonrpc": "2.1", "method": "echo", "id": "an_id"})).unwrap_err();
        assert_eq!(err.code(), -32600);
        assert_eq!(err.id, Some(RequestId::from("an_id")));

        let err = check_value(json!({"method": "echo", "id": 3})).unwrap_err();
        assert_eq!(err.id, Some(RequestId::from(3)));

        let err = check_value(json!({"jsonrpc": 2.0, "method": "echo", "id": 3})).unwrap_err();
        assert_eq!(err.code(), -32600);
    }

    #[test]
    fn test_bad_method() {
        for method in [json!(0), json!(""), json!(null), json!(["echo"])] {
            let err = check_value(json!({"jsonrpc": "2.0", "method": method, "id": 1})).unwrap_err();
            assert_eq!(err.code(), -32600);
            assert_eq!(err.id, Some(RequestId::from(1)));
        }
        let err = check_value(json!({"jsonrpc": "2.0", "id": 1})).unwrap_err();
        assert_eq!(err.code(), -32600);
    }

    #[test]
    fn test_structured_id_rejected_with_null_id() {
        for id in [json!([]), json!({})] {
            let err = check_value(json!({"jsonrpc": "2.0", "method": "echo", "id": id})).unwrap_err();
            assert_eq!(err.code(), -32600);
            assert_eq!(err.id, None);
        }
    }

    #[test]
    fn test_scalar_params_rejected() {
        let err = check_value(json!({"jsonrpc": "2.0", "method": "echo", "params": 5, "id": 1})).unwrap_err();
        assert_eq!(err.code(), -32600);

        let err = check_value(json!({
            "jsonrpc": "2.0", "method": "echo", "params": {"__args": 1}, "id": 1
        }))
        .unwrap_err();
        assert_eq!(err.code(), -32600);
    }

    #[test]
    fn test_extra_members_collected() {
        let request = check_value(json!({
            "jsonrpc": "2.0", "method": "echo", "id": 1, "auth": "token"
        }))
        .unwrap();
        assert_eq!(request.extra.len(), 1);
        assert_eq!(request.extra.get("auth"), Some(&json!("token")));
    }

    #[test]
    fn test_candidate_untouched() {
        let raw = json!({"jsonrpc": "1.0", "method": "echo", "id": 1});
        let candidate = RequestCandidate::new(raw.clone());
        let _ = check(&candidate);
        assert_eq!(candidate.raw(), &raw);
    }
}
