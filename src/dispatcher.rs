use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::{ActionError, Result};
use crate::provider::{FunctionProvider, ProviderResolver, DEFAULT_IDENTIFIER};
use crate::serializer::SpecSerializer;
use crate::types::{ApiSpecDocument, CallResult};

/// 把 `(identifier, functionName, arguments)` 路由到 provider 并返回统一信封。
/// 只持有只读的 resolver，可在并发请求间共享。
#[derive(Clone)]
pub struct Dispatcher {
    resolver: Arc<dyn ProviderResolver>,
}

impl Dispatcher {
    pub fn new(resolver: Arc<dyn ProviderResolver>) -> Self {
        Dispatcher { resolver }
    }

    pub fn resolver(&self) -> &Arc<dyn ProviderResolver> {
        &self.resolver
    }

    /// 未提供 identifier 时使用 `"default"`
    pub fn resolve_provider(&self, identifier: Option<&str>) -> Result<Arc<dyn FunctionProvider>> {
        let identifier = identifier.unwrap_or(DEFAULT_IDENTIFIER);
        self.resolver.resolve(identifier).map_err(|e| {
            warn!(identifier, "provider not found");
            e
        })
    }

    /// 以 provider 自身的 identifier 分发
    pub async fn dispatch(
        &self,
        provider: &dyn FunctionProvider,
        function_name: &str,
        arguments: Value,
    ) -> Result<CallResult> {
        self.dispatch_as(provider.identifier(), provider, function_name, arguments)
            .await
    }

    /// `identifier` 是调用方请求的名字，resolver 可能把多个名字映射到同一个 provider
    pub async fn dispatch_as(
        &self,
        identifier: &str,
        provider: &dyn FunctionProvider,
        function_name: &str,
        arguments: Value,
    ) -> Result<CallResult> {
        if !provider.has_function(function_name) {
            warn!(identifier, function_name, "function not found");
            return Err(ActionError::function_not_found(function_name, identifier));
        }

        debug!(identifier, function_name, "dispatching action");

        let outcome = AssertUnwindSafe(provider.invoke(function_name, arguments))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(panic_error(payload)));

        match outcome {
            Ok(result) => {
                debug!(
                    identifier,
                    function_name,
                    is_error = result.is_error,
                    "action finished"
                );
                Ok(result)
            }
            Err(source) => {
                let detail = format!("{:#}", source);
                error!(identifier, function_name, error = %detail, "action escaped with an error");
                Err(ActionError::Invocation {
                    function_name: function_name.to_string(),
                    source,
                })
            }
        }
    }

    /// resolve + dispatch
    pub async fn call(
        &self,
        identifier: Option<&str>,
        function_name: &str,
        arguments: Value,
    ) -> Result<CallResult> {
        let identifier = identifier.unwrap_or(DEFAULT_IDENTIFIER);
        let provider = self.resolve_provider(Some(identifier))?;
        self.dispatch_as(identifier, provider.as_ref(), function_name, arguments)
            .await
    }

    /// 生成指定 provider 的 OpenAPI 文档，路径中嵌入解析所用的 identifier
    pub fn describe(
        &self,
        serializer: &SpecSerializer,
        identifier: Option<&str>,
    ) -> Result<ApiSpecDocument> {
        let identifier = identifier.unwrap_or(serializer.identifier());
        let provider = self.resolve_provider(Some(identifier))?;
        serializer.serialize_for(identifier, provider.as_ref())
    }
}

fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    anyhow::anyhow!("handler panicked: {}", message)
}
