use thiserror::Error;

/// 分发与文档生成的错误分类
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("No provider registered for identifier '{identifier}'.")]
    ProviderNotFound { identifier: String },

    #[error("Function '{function_name}' not found for identifier '{identifier}'.")]
    FunctionNotFound {
        function_name: String,
        identifier: String,
    },

    #[error("Malformed function definition '{name}': {reason}")]
    MalformedDefinition { name: String, reason: String },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Function '{function_name}' failed: {source}")]
    Invocation {
        function_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ActionError {
    pub fn provider_not_found(identifier: impl Into<String>) -> Self {
        ActionError::ProviderNotFound {
            identifier: identifier.into(),
        }
    }

    pub fn function_not_found(
        function_name: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        ActionError::FunctionNotFound {
            function_name: function_name.into(),
            identifier: identifier.into(),
        }
    }

    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ActionError::MalformedDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// 调用方可见的“未找到”类错误
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ActionError::ProviderNotFound { .. } | ActionError::FunctionNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ActionError>;
