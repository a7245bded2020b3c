use serde::{Deserialize, Serialize};

/// 单个 action 的定义：名称、描述、参数 JSON Schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        FunctionDefinition {
            name: name.into(),
            description: description.into(),
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, schema: serde_json::Value) -> Self {
        self.parameters = Some(schema);
        self
    }
}

/// 调用结果的内容：单个字符串或字符串数组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<String>),
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<Vec<String>> for Content {
    fn from(parts: Vec<String>) -> Self {
        Content::Parts(parts)
    }
}

/// 统一的调用结果信封 `{isError, content}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResult {
    #[serde(default)]
    pub is_error: bool,
    pub content: Content,
}

impl CallResult {
    pub fn success(content: impl Into<Content>) -> Self {
        CallResult {
            is_error: false,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<Content>) -> Self {
        CallResult {
            is_error: true,
            content: content.into(),
        }
    }

    /// 把 `anyhow::Result<String>` 折叠为信封，错误变为 `isError = true`
    pub fn from_outcome<C: Into<Content>>(outcome: anyhow::Result<C>) -> Self {
        match outcome {
            Ok(content) => CallResult::success(content),
            Err(e) => CallResult::error(format!("{:#}", e)),
        }
    }
}
