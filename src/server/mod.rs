//! HTTP 边界
//!
//! ```text
//! POST /actions/:identifier/:function_name   调用 action，返回 {isError, content}
//! GET  /openapi.json                         默认 identifier 的 OpenAPI 文档
//! GET  /openapi/:identifier                  指定 identifier 的 OpenAPI 文档
//! GET  /health
//! ```

mod error;
mod handlers;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::builtins::workspace_provider;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::provider::{ProviderMap, ProviderResolver};
use crate::serializer::SpecSerializer;

pub use error::ErrorBody;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub serializer: Arc<SpecSerializer>,
}

impl AppState {
    pub fn new(resolver: Arc<dyn ProviderResolver>, serializer: SpecSerializer) -> Self {
        AppState {
            dispatcher: Arc::new(Dispatcher::new(resolver)),
            serializer: Arc::new(serializer),
        }
    }

    /// 按配置构建：内置 workspace provider 注册在配置的 identifier 下
    pub fn from_config(config: &Config) -> Result<Self> {
        config.ensure_workspace()?;

        let provider = workspace_provider(
            config.spec.identifier.clone(),
            config.workspace.root.clone(),
        )
        .context("failed to build workspace provider")?;
        let providers = ProviderMap::new().with(Arc::new(provider));

        Ok(AppState::new(Arc::new(providers), config.spec.serializer()))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(handlers::describe_default))
        .route("/openapi/:identifier", get(handlers::describe))
        .route(
            "/actions/:identifier/:function_name",
            post(handlers::call_action),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %Uuid::new_v4(),
                )
            }),
        )
        .with_state(state)
}

pub async fn serve(state: AppState, bind_addr: &str) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
