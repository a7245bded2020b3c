use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ActionError, Result};

use super::FunctionProvider;

pub const DEFAULT_IDENTIFIER: &str = "default";

/// identifier 到 provider 的解析
pub trait ProviderResolver: Send + Sync {
    fn resolve(&self, identifier: &str) -> Result<Arc<dyn FunctionProvider>>;

    fn identifiers(&self) -> Vec<String>;
}

/// 启动时填充、之后只读的 provider 表
#[derive(Default)]
pub struct ProviderMap {
    providers: HashMap<String, Arc<dyn FunctionProvider>>,
}

impl ProviderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以 provider 自身的 identifier 注册，同名覆盖
    pub fn insert(&mut self, provider: Arc<dyn FunctionProvider>) -> &mut Self {
        self.providers
            .insert(provider.identifier().to_string(), provider);
        self
    }

    pub fn with(mut self, provider: Arc<dyn FunctionProvider>) -> Self {
        self.insert(provider);
        self
    }
}

impl ProviderResolver for ProviderMap {
    fn resolve(&self, identifier: &str) -> Result<Arc<dyn FunctionProvider>> {
        self.providers
            .get(identifier)
            .cloned()
            .ok_or_else(|| ActionError::provider_not_found(identifier))
    }

    fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }
}
