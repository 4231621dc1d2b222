//! Registered tool functions.
//!
//! Maps a function name to an async handler. Handlers receive the call's
//! arguments as a schema-less JSON value and return a JSON value that is
//! encoded into the tool output string. The argument contract is documented
//! per function by whoever registers it; nothing is enforced structurally.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use parley_types::assistant::FunctionCall;
use parley_types::error::ToolExecutionError;

type ToolFuture = Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>>;
type ToolFn = dyn Fn(Value) -> ToolFuture + Send + Sync;

/// A registered handler, cheap to clone into a poll task.
#[derive(Clone)]
pub struct ToolHandler {
    name: String,
    handler: Arc<ToolFn>,
}

impl ToolHandler {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parse the call's arguments, run the handler, and JSON-encode its output.
    pub async fn call(&self, function: &FunctionCall) -> Result<String, ToolExecutionError> {
        let args: Value = serde_json::from_str(&function.arguments).map_err(|e| {
            ToolExecutionError::InvalidArguments {
                function: self.name.clone(),
                message: e.to_string(),
            }
        })?;

        let output = (self.handler)(args)
            .await
            .map_err(|e| ToolExecutionError::Handler {
                function: self.name.clone(),
                message: format!("{e:#}"),
            })?;

        serde_json::to_string(&output).map_err(|e| ToolExecutionError::Handler {
            function: self.name.clone(),
            message: format!("output is not serializable: {e}"),
        })
    }
}

/// Name-indexed tool handlers for one session.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, ToolHandler>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`.
    ///
    /// If a handler with this name already exists, it is replaced.
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let name = name.into();
        self.functions.insert(
            name.clone(),
            ToolHandler {
                name,
                handler: Arc::new(move |args| Box::pin(handler(args))),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&ToolHandler> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// List all registered function names.
    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(|s| s.as_str()).collect()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, arguments: &str) -> FunctionCall {
        FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[tokio::test]
    async fn handler_output_is_json_encoded() {
        let mut registry = FunctionRegistry::new();
        registry.register("lookup_price", |args| async move {
            let symbol = args["symbol"].as_str().unwrap_or_default().to_string();
            Ok(json!({ "symbol": symbol, "price": 42 }))
        });

        let handler = registry.get("lookup_price").unwrap();
        let output = handler
            .call(&call("lookup_price", r#"{"symbol":"BTC"}"#))
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!({ "symbol": "BTC", "price": 42 }));
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let mut registry = FunctionRegistry::new();
        registry.register("version", |_args| async { Ok(json!(1)) });
        registry.register("version", |_args| async { Ok(json!(2)) });

        assert_eq!(registry.names(), vec!["version"]);
        let output = registry
            .get("version")
            .unwrap()
            .call(&call("version", "{}"))
            .await
            .unwrap();
        assert_eq!(output, "2");
    }

    #[tokio::test]
    async fn malformed_arguments_are_reported() {
        let mut registry = FunctionRegistry::new();
        registry.register("echo", |args| async move { Ok(args) });

        let err = registry
            .get("echo")
            .unwrap()
            .call(&call("echo", "not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolExecutionError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn handler_failure_is_reported() {
        let mut registry = FunctionRegistry::new();
        registry.register("explode", |_args| async {
            Err::<Value, _>(anyhow::anyhow!("boom"))
        });

        let err = registry
            .get("explode")
            .unwrap()
            .call(&call("explode", "{}"))
            .await
            .unwrap_err();
        match err {
            ToolExecutionError::Handler { function, message } => {
                assert_eq!(function, "explode");
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_function_is_absent() {
        let registry = FunctionRegistry::new();
        assert!(registry.get("lookup_price").is_none());
        assert!(!registry.contains("lookup_price"));
    }
}
