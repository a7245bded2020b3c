//! HTTP-level tests for the action routes and the OpenAPI description.

use std::sync::Arc;

use action_gateway::{
    build_router, AppState, CallResult, FunctionDefinition, FunctionRegistry, ProviderMap,
    RegistryProvider, SpecSerializer,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

// ── Test app builder ───────────────────────────────────────────

fn search_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "q": { "type": "string" } },
        "required": ["q"]
    })
}

fn build_test_app() -> axum::Router {
    let mut registry = FunctionRegistry::new();
    registry
        .register_fn(
            FunctionDefinition::new("search", "Search items").with_parameters(search_schema()),
            |args| match args.get("q").and_then(|v| v.as_str()) {
                Some(q) => Ok(CallResult::success(vec![format!("hit: {}", q)])),
                None => Ok(CallResult::error("missing q")),
            },
        )
        .unwrap()
        .register_fn(FunctionDefinition::new("ping", "Ping"), |_| {
            Ok(CallResult::success("pong"))
        })
        .unwrap()
        .register_fn(FunctionDefinition::new("explode", "Always fails"), |_| {
            Err(anyhow::anyhow!("database exploded"))
        })
        .unwrap()
        .register_fn(FunctionDefinition::new("crash", "Panics"), |_| {
            panic!("index out of bounds in handler")
        })
        .unwrap();

    let mut other = FunctionRegistry::new();
    other
        .register_fn(FunctionDefinition::new("refund", "Refund an order"), |_| {
            Ok(CallResult::success("refunded"))
        })
        .unwrap();

    let providers = ProviderMap::new()
        .with(Arc::new(RegistryProvider::new("default", registry)))
        .with(Arc::new(RegistryProvider::new("billing", other)));

    let state = AppState::new(Arc::new(providers), SpecSerializer::default());
    build_router(state)
}

// ── Helpers ────────────────────────────────────────────────────

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(
        |_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }),
    )
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ── Action calls ───────────────────────────────────────────────

#[tokio::test]
async fn test_call_returns_envelope() {
    let resp = build_test_app()
        .oneshot(post("/actions/default/search", r#"{"q":"rust"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({ "isError": false, "content": ["hit: rust"] })
    );
}

#[tokio::test]
async fn test_provider_level_error_is_still_200() {
    let resp = build_test_app()
        .oneshot(post("/actions/default/search", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({ "isError": true, "content": "missing q" })
    );
}

#[tokio::test]
async fn test_empty_body_means_no_arguments() {
    let resp = build_test_app()
        .oneshot(post("/actions/default/ping", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["content"], "pong");
}

#[tokio::test]
async fn test_missing_function_is_404_naming_both() {
    let resp = build_test_app()
        .oneshot(post("/actions/default/missing", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(
        body["error"],
        "Function 'missing' not found for identifier 'default'."
    );
}

#[tokio::test]
async fn test_function_of_other_provider_is_404() {
    let resp = build_test_app()
        .oneshot(post("/actions/default/refund", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = build_test_app()
        .oneshot(post("/actions/billing/refund", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_identifier_is_404() {
    let resp = build_test_app()
        .oneshot(post("/actions/ghost/search", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_non_object_body_is_400() {
    let resp = build_test_app()
        .oneshot(post("/actions/default/search", "[1,2,3]"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_escaped_error_is_500_without_detail() {
    let resp = build_test_app()
        .oneshot(post("/actions/default/explode", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("explode"));
    assert!(!message.contains("database"));
}

#[tokio::test]
async fn test_panicking_handler_is_500_and_server_keeps_serving() {
    let app = build_test_app();

    let resp = app
        .clone()
        .oneshot(post("/actions/default/crash", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Function 'crash' failed.");

    let resp = app
        .oneshot(post("/actions/default/ping", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ── Describe ───────────────────────────────────────────────────

#[tokio::test]
async fn test_openapi_document_for_default() {
    let resp = build_test_app().oneshot(get("/openapi.json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"],
        "application/json"
    );

    let doc = body_json(resp).await;
    assert_eq!(doc["openapi"], "3.1.0");
    assert_eq!(doc["info"]["title"], "Action API");

    let search = &doc["paths"]["/actions/default/search"]["post"];
    assert_eq!(search["operationId"], "search");
    assert_eq!(search["requestBody"]["required"], true);
    assert_eq!(
        search["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/searchRequest"
    );
    assert_eq!(doc["components"]["schemas"]["searchRequest"], search_schema());

    let ping = &doc["paths"]["/actions/default/ping"]["post"];
    assert!(ping.get("requestBody").is_none());
    assert!(doc["components"]["schemas"]["Response"].is_object());

    let paths: Vec<_> = doc["paths"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(
        paths,
        vec![
            "/actions/default/search",
            "/actions/default/ping",
            "/actions/default/explode",
            "/actions/default/crash"
        ]
    );
}

#[tokio::test]
async fn test_openapi_document_for_identifier() {
    let resp = build_test_app()
        .oneshot(get("/openapi/billing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let doc = body_json(resp).await;
    let paths: Vec<_> = doc["paths"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(paths, vec!["/actions/billing/refund"]);
}

#[tokio::test]
async fn test_openapi_unknown_identifier_is_404() {
    let resp = build_test_app()
        .oneshot(get("/openapi/ghost"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let resp = build_test_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ok");
}
