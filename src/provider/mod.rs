//! Function provider 能力接口
//!
//! 一个 provider 以字符串 identifier 标识，暴露一组可按名称调用的函数。
//! 核心只依赖这里的 trait：枚举定义、判断存在、按名称调用。

mod registry;
mod resolver;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{CallResult, FunctionDefinition};

pub use registry::{FnHandler, FunctionHandler, FunctionRegistry, RegistryProvider};
pub use resolver::{ProviderMap, ProviderResolver, DEFAULT_IDENTIFIER};

#[async_trait]
pub trait FunctionProvider: Send + Sync {
    fn identifier(&self) -> &str;

    /// 按 provider 声明顺序返回所有函数定义
    fn list_definitions(&self) -> Vec<FunctionDefinition>;

    fn has_function(&self, name: &str) -> bool;

    /// 调用函数；内部失败应折叠为 `isError = true` 的结果，而不是返回 `Err`
    async fn invoke(&self, name: &str, arguments: Value) -> anyhow::Result<CallResult>;
}
