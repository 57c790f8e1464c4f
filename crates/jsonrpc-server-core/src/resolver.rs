//! Method resolution: the registration table that maps method names to
//! handlers, and the trait the dispatcher resolves through.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::codec::RpcValue;
use crate::error::MethodError;
use crate::params::{ParamShape, Params};

/// Result of invoking a method handler
pub type MethodResult = Result<RpcValue, MethodError>;

/// Post-processing applied to a raw method result before it is wrapped
pub type Postprocessor = Arc<dyn Fn(RpcValue, &Params) -> MethodResult + Send + Sync>;

/// Trait for handling JSON-RPC method calls
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Invoke the method. Returns domain errors only; the dispatcher converts
    /// them to JSON-RPC errors.
    async fn call(&self, params: Params) -> MethodResult;
}

/// A closure-based handler
pub struct FunctionHandler<F> {
    handler_fn: F,
}

impl<F> FunctionHandler<F> {
    pub fn new(handler_fn: F) -> Self {
        Self { handler_fn }
    }
}

#[async_trait]
impl<F, Fut> MethodHandler for FunctionHandler<F>
where
    F: Fn(Params) -> Fut + Send + Sync,
    Fut: Future<Output = MethodResult> + Send + 'static,
{
    async fn call(&self, params: Params) -> MethodResult {
        (self.handler_fn)(params).await
    }
}

/// Wrap an async closure as a [`MethodHandler`]
pub fn handler_fn<F, Fut>(f: F) -> FunctionHandler<F>
where
    F: Fn(Params) -> Fut + Send + Sync,
    Fut: Future<Output = MethodResult> + Send + 'static,
{
    FunctionHandler::new(f)
}

/// Registration entry for one method
pub struct MethodDescriptor {
    pub name: String,
    pub shape: ParamShape,
    pub handler: Arc<dyn MethodHandler>,
    pub postprocessor: Option<Postprocessor>,
}

impl MethodDescriptor {
    pub fn new<H>(name: impl Into<String>, shape: ParamShape, handler: H) -> Self
    where
        H: MethodHandler + 'static,
    {
        Self {
            name: name.into(),
            shape,
            handler: Arc::new(handler),
            postprocessor: None,
        }
    }

    pub fn with_postprocessor<P>(mut self, postprocessor: P) -> Self
    where
        P: Fn(RpcValue, &Params) -> MethodResult + Send + Sync + 'static,
    {
        self.postprocessor = Some(Arc::new(postprocessor));
        self
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("postprocessor", &self.postprocessor.is_some())
            .finish()
    }
}

/// A handler found by a resolver, plus whether its raw result must be
/// post-processed before it is wrapped in a response.
#[derive(Debug, Clone)]
pub struct ResolvedMethod {
    pub descriptor: Arc<MethodDescriptor>,
    pub postprocess: bool,
}

/// Looks up the handler for a method name.
pub trait MethodResolver: Send + Sync {
    /// Return the handler for `name`, or `None` if the method is not found.
    fn find_method(
        &self,
        name: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> Option<ResolvedMethod>;

    /// Adjust or validate a raw result. Only called when the resolution
    /// requested it.
    fn postprocess(
        &self,
        method: &MethodDescriptor,
        result: RpcValue,
        params: &Params,
    ) -> MethodResult {
        match &method.postprocessor {
            Some(postprocessor) => postprocessor(result, params),
            None => Ok(result),
        }
    }
}

/// Name → descriptor table, populated once at startup and read-only after.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    methods: HashMap<String, Arc<MethodDescriptor>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a method name
    pub fn register<H>(self, name: impl Into<String>, shape: ParamShape, handler: H) -> Self
    where
        H: MethodHandler + 'static,
    {
        self.register_descriptor(MethodDescriptor::new(name, shape, handler))
    }

    pub fn register_descriptor(mut self, descriptor: MethodDescriptor) -> Self {
        self.methods
            .insert(descriptor.name.clone(), Arc::new(descriptor));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Get all registered methods
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}

impl MethodResolver for MethodRegistry {
    fn find_method(
        &self,
        name: &str,
        _args: &[Value],
        _kwargs: &Map<String, Value>,
    ) -> Option<ResolvedMethod> {
        self.methods.get(name).map(|descriptor| ResolvedMethod {
            descriptor: Arc::clone(descriptor),
            postprocess: descriptor.postprocessor.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn echo(params: Params) -> MethodResult {
        Ok(params.get("v").cloned().unwrap_or(Value::Null).into())
    }

    async fn count(params: Params) -> MethodResult {
        Ok(json!(params.args().len()).into())
    }

    fn echo_registry() -> MethodRegistry {
        MethodRegistry::new()
            .register("echo", ParamShape::named(["v"]), handler_fn(echo))
            .register_descriptor(
                MethodDescriptor::new("count", ParamShape::Any, handler_fn(count))
                    .with_postprocessor(|result, _params| {
                        let n = result.to_json().map_err(MethodError::from_error)?;
                        Ok(json!({ "count": n }).into())
                    }),
            )
    }

    #[test]
    fn test_find_method() {
        let registry = echo_registry();
        let found = registry.find_method("echo", &[], &Map::new()).unwrap();
        assert_eq!(found.descriptor.name, "echo");
        assert!(!found.postprocess);

        assert!(registry.find_method("missing", &[], &Map::new()).is_none());
        assert_eq!(registry.method_names(), vec!["count", "echo"]);
    }

    #[tokio::test]
    async fn test_handler_invocation() {
        let registry = echo_registry();
        let found = registry.find_method("echo", &[], &Map::new()).unwrap();
        let params = found
            .descriptor
            .shape
            .bind(vec![json!("x")], Map::new(), Map::new())
            .unwrap();
        let result = found.descriptor.handler.call(params).await.unwrap();
        assert!(result == json!("x"));
    }

    #[tokio::test]
    async fn test_postprocess() {
        let registry = echo_registry();
        let found = registry.find_method("count", &[], &Map::new()).unwrap();
        assert!(found.postprocess);

        let params = Params::new(vec![json!(1), json!(2)], Map::new());
        let raw = found.descriptor.handler.call(params.clone()).await.unwrap();
        let processed = registry
            .postprocess(&found.descriptor, raw, &params)
            .unwrap();
        assert!(processed == json!({"count": 2}));
    }
}
