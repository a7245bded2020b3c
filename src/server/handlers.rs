use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Map, Value};

use crate::error::{ActionError, Result};
use crate::types::{ApiSpecDocument, CallResult};

use super::AppState;

/// POST /actions/:identifier/:function_name
pub async fn call_action(
    State(state): State<AppState>,
    Path((identifier, function_name)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<CallResult>> {
    let arguments = parse_arguments(&body)?;
    let result = state
        .dispatcher
        .call(Some(&identifier), &function_name, arguments)
        .await?;
    Ok(Json(result))
}

/// GET /openapi.json
pub async fn describe_default(State(state): State<AppState>) -> Result<Json<ApiSpecDocument>> {
    let document = state.dispatcher.describe(&state.serializer, None)?;
    Ok(Json(document))
}

/// GET /openapi/:identifier
pub async fn describe(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<ApiSpecDocument>> {
    let document = state
        .dispatcher
        .describe(&state.serializer, Some(&identifier))?;
    Ok(Json(document))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// 空请求体视为 `{}`；其余必须是 JSON 对象
fn parse_arguments(body: &[u8]) -> Result<Value> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        ActionError::InvalidArguments(format!("request body is not valid JSON: {}", e))
    })?;

    if !value.is_object() {
        return Err(ActionError::InvalidArguments(
            "request body must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}
