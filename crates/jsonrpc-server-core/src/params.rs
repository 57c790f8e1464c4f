//! Call arguments as seen by a method handler, and the argument shapes a
//! method can declare.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::MethodError;

/// Arguments handed to a method handler.
///
/// `kwargs` already contains the call context (request extras and whatever
/// the transport supplies), overridden by the request's own named arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    args: Vec<Value>,
    kwargs: Map<String, Value>,
}

impl Params {
    pub fn new(args: Vec<Value>, kwargs: Map<String, Value>) -> Self {
        Self { args, kwargs }
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &Map<String, Value> {
        &self.kwargs
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    /// Typed access to a named argument. Missing or mistyped arguments are
    /// invalid params.
    pub fn arg<T>(&self, name: &str) -> Result<T, MethodError>
    where
        T: DeserializeOwned,
    {
        let value = self
            .kwargs
            .get(name)
            .ok_or_else(|| MethodError::invalid_params(format!("missing argument '{}'", name)))?;
        serde_json::from_value(value.clone()).map_err(|e| {
            MethodError::invalid_params(format!("argument '{}': {}", name, e))
        })
    }

    /// Typed access to a positional argument
    pub fn positional<T>(&self, index: usize) -> Result<T, MethodError>
    where
        T: DeserializeOwned,
    {
        let value = self.args.get(index).ok_or_else(|| {
            MethodError::invalid_params(format!("missing positional argument {}", index))
        })?;
        serde_json::from_value(value.clone()).map_err(|e| {
            MethodError::invalid_params(format!("argument {}: {}", index, e))
        })
    }

    /// Deserialize all arguments at once: positional arguments as a sequence,
    /// otherwise named arguments as a map.
    pub fn parse<T>(&self) -> Result<T, MethodError>
    where
        T: DeserializeOwned,
    {
        let value = if self.args.is_empty() {
            Value::Object(self.kwargs.clone())
        } else {
            Value::Array(self.args.clone())
        };
        Ok(serde_json::from_value(value)?)
    }
}

/// The argument shape a registered method accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParamShape {
    /// Arguments are passed through untouched
    #[default]
    Any,
    /// Every name is required; positional arguments bind to names in order
    Named(Vec<String>),
}

impl ParamShape {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamShape::Named(names.into_iter().map(Into::into).collect())
    }

    /// Bind request arguments plus call context into handler params.
    ///
    /// Arity and naming are only checked against the request's own
    /// arguments; context entries never count as arguments.
    pub fn bind(
        &self,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
        context: Map<String, Value>,
    ) -> Result<Params, MethodError> {
        let mut merged = context;
        match self {
            ParamShape::Any => {
                merged.extend(kwargs);
                Ok(Params::new(args, merged))
            }
            ParamShape::Named(names) => {
                if args.len() > names.len() {
                    return Err(MethodError::invalid_params(format!(
                        "expected at most {} positional arguments, got {}",
                        names.len(),
                        args.len()
                    )));
                }

                let mut bound: Map<String, Value> =
                    names.iter().cloned().zip(args).collect();

                for (key, value) in kwargs {
                    if !names.contains(&key) {
                        return Err(MethodError::invalid_params(format!(
                            "unexpected argument '{}'",
                            key
                        )));
                    }
                    if bound.contains_key(&key) {
                        return Err(MethodError::invalid_params(format!(
                            "argument '{}' given both by position and by name",
                            key
                        )));
                    }
                    bound.insert(key, value);
                }

                if let Some(missing) = names.iter().find(|name| !bound.contains_key(*name)) {
                    return Err(MethodError::invalid_params(format!(
                        "missing argument '{}'",
                        missing
                    )));
                }

                merged.extend(bound);
                Ok(Params::new(Vec::new(), merged))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_named_binds_positional() {
        let shape = ParamShape::named(["a", "b"]);
        let params = shape.bind(vec![json!(1), json!(2)], Map::new(), Map::new()).unwrap();
        assert_eq!(params.arg::<i64>("a").unwrap(), 1);
        assert_eq!(params.arg::<i64>("b").unwrap(), 2);
        assert!(params.args().is_empty());
    }

    #[test]
    fn test_named_binds_mixed() {
        let shape = ParamShape::named(["a", "b"]);
        let params = shape
            .bind(vec![json!(1)], map(json!({"b": 5})), Map::new())
            .unwrap();
        assert_eq!(params.get("b"), Some(&json!(5)));
    }

    #[test]
    fn test_named_arity_errors() {
        let shape = ParamShape::named(["a", "b"]);

        let too_many = shape.bind(vec![json!(1), json!(2), json!(3)], Map::new(), Map::new());
        assert!(matches!(too_many, Err(MethodError::InvalidParams(_))));

        let missing = shape.bind(vec![json!(1)], Map::new(), Map::new());
        assert!(matches!(missing, Err(MethodError::InvalidParams(m)) if m.contains("'b'")));

        let unknown = shape.bind(vec![], map(json!({"a": 1, "b": 2, "c": 3})), Map::new());
        assert!(matches!(unknown, Err(MethodError::InvalidParams(m)) if m.contains("'c'")));

        let duplicate = shape.bind(vec![json!(1)], map(json!({"a": 1, "b": 2})), Map::new());
        assert!(matches!(duplicate, Err(MethodError::InvalidParams(_))));
    }

    #[test]
    fn test_context_does_not_count_as_argument() {
        let shape = ParamShape::named(["v"]);
        let params = shape
            .bind(vec![json!("x")], Map::new(), map(json!({"peer": "127.0.0.1"})))
            .unwrap();
        assert_eq!(params.get("v"), Some(&json!("x")));
        assert_eq!(params.get("peer"), Some(&json!("127.0.0.1")));
    }

    #[test]
    fn test_request_kwargs_override_context() {
        let params = ParamShape::Any
            .bind(vec![], map(json!({"user": "alice"})), map(json!({"user": "ctx", "peer": 1})))
            .unwrap();
        assert_eq!(params.get("user"), Some(&json!("alice")));
        assert_eq!(params.get("peer"), Some(&json!(1)));
    }

    #[test]
    fn test_typed_access_errors() {
        let params = Params::new(vec![json!("3")], map(json!({"a": "3"})));
        assert!(matches!(params.arg::<f64>("a"), Err(MethodError::InvalidParams(_))));
        assert!(matches!(params.arg::<f64>("zz"), Err(MethodError::InvalidParams(_))));
        assert!(matches!(params.positional::<f64>(0), Err(MethodError::InvalidParams(_))));
        assert_eq!(params.positional::<String>(0).unwrap(), "3");
    }

    #[test]
    fn test_parse_struct() {
        #[derive(Deserialize)]
        struct Pair {
            a: i64,
            b: i64,
        }

        let named = Params::new(vec![], map(json!({"a": 3, "b": 2})));
        let pair: Pair = named.parse().unwrap();
        assert_eq!(pair.a + pair.b, 5);

        let positional = Params::new(vec![json!(1), json!(2)], Map::new());
        let (a, b): (i64, i64) = positional.parse().unwrap();
        assert_eq!(a + b, 3);
    }
}
