//! 内置 workspace provider：文件读写、时间、网页抓取与搜索
//!
//! 所有内部失败都折叠为 `isError = true` 的 `CallResult`，不会向分发层抛出错误。

pub mod fs;
pub mod time;
pub mod web;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{ActionError, Result as ActionResult};
use crate::provider::{FunctionHandler, FunctionRegistry, RegistryProvider};
use crate::types::{CallResult, FunctionDefinition};

use self::fs::FsTools;

/// 预定义的函数列表（懒加载，只初始化一次）
static DEFINITIONS: Lazy<Vec<FunctionDefinition>> = Lazy::new(|| {
    vec![
        FunctionDefinition::new("fs_read", "Read a file inside the workspace").with_parameters(
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File path relative to the workspace"
                    }
                },
                "required": ["path"]
            }),
        ),
        FunctionDefinition::new("fs_write", "Write a file inside the workspace (overwrites)")
            .with_parameters(json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File path relative to the workspace"
                    },
                    "content": {
                        "type": "string",
                        "description": "File content"
                    }
                },
                "required": ["path", "content"]
            })),
        FunctionDefinition::new(
            "fs_patch",
            "Replace exactly one occurrence of a string in a workspace file",
        )
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path relative to the workspace"
                },
                "old_string": {
                    "type": "string",
                    "description": "Text to find"
                },
                "new_string": {
                    "type": "string",
                    "description": "Replacement text"
                }
            },
            "required": ["path", "old_string", "new_string"]
        })),
        FunctionDefinition::new("fs_list", "List a directory inside the workspace").with_parameters(
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Directory path relative to the workspace"
                    }
                },
                "required": ["path"]
            }),
        ),
        FunctionDefinition::new("get_time", "Get the current local time"),
        FunctionDefinition::new("web_fetch", "Fetch a web page as plain text").with_parameters(
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Page URL"
                    }
                },
                "required": ["url"]
            }),
        ),
        FunctionDefinition::new("web_search", "Search the web").with_parameters(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search keywords"
                }
            },
            "required": ["query"]
        })),
    ]
});

fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .with_context(|| format!("missing string argument: {}", key))
}

struct FsHandler {
    tools: Arc<FsTools>,
    op: FsOp,
}

#[derive(Clone, Copy)]
enum FsOp {
    Read,
    Write,
    Patch,
    List,
}

impl FsHandler {
    fn run(&self, args: &Value) -> Result<CallResult> {
        let path = str_arg(args, "path")?;
        let result = match self.op {
            FsOp::Read => CallResult::success(self.tools.read(path)?),
            FsOp::Write => {
                let content = str_arg(args, "content")?;
                CallResult::success(self.tools.write(path, content)?)
            }
            FsOp::Patch => {
                let old_string = str_arg(args, "old_string")?;
                let new_string = str_arg(args, "new_string")?;
                CallResult::success(self.tools.patch(path, old_string, new_string)?)
            }
            FsOp::List => CallResult::success(self.tools.list(path)?),
        };
        Ok(result)
    }
}

#[async_trait]
impl FunctionHandler for FsHandler {
    async fn call(&self, arguments: Value) -> Result<CallResult> {
        Ok(self.run(&arguments).unwrap_or_else(|e| CallResult::error(format!("{:#}", e))))
    }
}

struct WebFetch;

#[async_trait]
impl FunctionHandler for WebFetch {
    async fn call(&self, arguments: Value) -> Result<CallResult> {
        let outcome = match str_arg(&arguments, "url") {
            Ok(url) => web::fetch(url).await,
            Err(e) => Err(e),
        };
        Ok(CallResult::from_outcome(outcome))
    }
}

struct WebSearch;

#[async_trait]
impl FunctionHandler for WebSearch {
    async fn call(&self, arguments: Value) -> Result<CallResult> {
        let outcome = match str_arg(&arguments, "query") {
            Ok(query) => web::search(query).await,
            Err(e) => Err(e),
        };
        Ok(CallResult::from_outcome(outcome))
    }
}

struct GetTime;

#[async_trait]
impl FunctionHandler for GetTime {
    async fn call(&self, _arguments: Value) -> Result<CallResult> {
        Ok(CallResult::success(time::now()))
    }
}

/// 以 `root` 为 workspace 构建内置 provider
pub fn workspace_provider(
    identifier: impl Into<String>,
    root: PathBuf,
) -> ActionResult<RegistryProvider> {
    let tools = Arc::new(FsTools::new(root));
    let fs_handler = |op| -> Arc<dyn FunctionHandler> {
        Arc::new(FsHandler {
            tools: Arc::clone(&tools),
            op,
        })
    };

    let mut registry = FunctionRegistry::new();
    for definition in DEFINITIONS.iter() {
        let handler: Arc<dyn FunctionHandler> = match definition.name.as_str() {
            "fs_read" => fs_handler(FsOp::Read),
            "fs_write" => fs_handler(FsOp::Write),
            "fs_patch" => fs_handler(FsOp::Patch),
            "fs_list" => fs_handler(FsOp::List),
            "get_time" => Arc::new(GetTime),
            "web_fetch" => Arc::new(WebFetch),
            "web_search" => Arc::new(WebSearch),
            other => return Err(ActionError::malformed(other, "no built-in handler")),
        };
        registry.register_shared(definition.clone(), handler)?;
    }

    Ok(RegistryProvider::new(identifier, registry))
}
