use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ActionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ActionError::ProviderNotFound { .. } | ActionError::FunctionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ActionError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
            ActionError::MalformedDefinition { .. }
            | ActionError::Invocation { .. }
            | ActionError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // 调用失败的细节只写日志
        let error = match &self {
            ActionError::Invocation { function_name, .. } => {
                format!("Function '{}' failed.", function_name)
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
