use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ActionError, Result};
use crate::types::{CallResult, FunctionDefinition};

use super::FunctionProvider;

/// 单个函数的执行体
#[async_trait]
pub trait FunctionHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> anyhow::Result<CallResult>;
}

/// 把同步闭包包装成 handler
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> FunctionHandler for FnHandler<F>
where
    F: Fn(Value) -> anyhow::Result<CallResult> + Send + Sync,
{
    async fn call(&self, arguments: Value) -> anyhow::Result<CallResult> {
        (self.0)(arguments)
    }
}

struct Entry {
    definition: FunctionDefinition,
    handler: Arc<dyn FunctionHandler>,
}

/// 名称到 handler 的有序注册表，构建 provider 时一次性填充
#[derive(Default)]
pub struct FunctionRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, definition: FunctionDefinition, handler: H) -> Result<&mut Self>
    where
        H: FunctionHandler + 'static,
    {
        self.register_shared(definition, Arc::new(handler))
    }

    pub fn register_shared(
        &mut self,
        definition: FunctionDefinition,
        handler: Arc<dyn FunctionHandler>,
    ) -> Result<&mut Self> {
        let name = definition.name.clone();
        if name.is_empty() {
            return Err(ActionError::malformed(name, "function name is empty"));
        }
        if name.contains('/') {
            return Err(ActionError::malformed(name, "function name must not contain '/'"));
        }
        if self.index.contains_key(&name) {
            return Err(ActionError::malformed(name, "function name is already registered"));
        }

        self.index.insert(name, self.entries.len());
        self.entries.push(Entry {
            definition,
            handler,
        });
        Ok(self)
    }

    pub fn register_fn<F>(&mut self, definition: FunctionDefinition, f: F) -> Result<&mut Self>
    where
        F: Fn(Value) -> anyhow::Result<CallResult> + Send + Sync + 'static,
    {
        self.register(definition, FnHandler(f))
    }

    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn handler(&self, name: &str) -> Option<Arc<dyn FunctionHandler>> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.entries[i].handler))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 基于注册表的通用 provider
pub struct RegistryProvider {
    identifier: String,
    registry: FunctionRegistry,
}

impl RegistryProvider {
    pub fn new(identifier: impl Into<String>, registry: FunctionRegistry) -> Self {
        RegistryProvider {
            identifier: identifier.into(),
            registry,
        }
    }
}

#[async_trait]
impl FunctionProvider for RegistryProvider {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn list_definitions(&self) -> Vec<FunctionDefinition> {
        self.registry.definitions()
    }

    fn has_function(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    async fn invoke(&self, name: &str, arguments: Value) -> anyhow::Result<CallResult> {
        let handler = self
            .registry
            .handler(name)
            .ok_or_else(|| anyhow!("unknown function: {}", name))?;
        handler.call(arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo(arguments: Value) -> anyhow::Result<CallResult> {
        Ok(CallResult::success(arguments.to_string()))
    }

    #[test]
    fn preserves_registration_order() {
        let mut registry = FunctionRegistry::new();
        registry
            .register_fn(FunctionDefinition::new("zeta", ""), echo)
            .unwrap()
            .register_fn(FunctionDefinition::new("alpha", ""), echo)
            .unwrap();

        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rejects_duplicate_and_empty_names() {
        let mut registry = FunctionRegistry::new();
        registry
            .register_fn(FunctionDefinition::new("a", ""), echo)
            .unwrap();

        let dup = registry.register_fn(FunctionDefinition::new("a", ""), echo);
        assert!(matches!(dup, Err(ActionError::MalformedDefinition { .. })));

        let empty = registry.register_fn(FunctionDefinition::new("", ""), echo);
        assert!(matches!(empty, Err(ActionError::MalformedDefinition { .. })));

        let slash = registry.register_fn(FunctionDefinition::new("a/b", ""), echo);
        assert!(matches!(slash, Err(ActionError::MalformedDefinition { .. })));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn provider_invokes_registered_handler() {
        let mut registry = FunctionRegistry::new();
        registry
            .register_fn(FunctionDefinition::new("echo", "Echo"), echo)
            .unwrap();
        let provider = RegistryProvider::new("default", registry);

        assert!(provider.has_function("echo"));
        assert!(!provider.has_function("missing"));

        let result = provider.invoke("echo", json!({ "x": 1 })).await.unwrap();
        assert_eq!(result, CallResult::success(r#"{"x":1}"#));
        assert!(provider.invoke("missing", json!({})).await.is_err());
    }
}
