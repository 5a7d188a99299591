//! Waggle Web API
//!
//! 启动: cargo run --bin waggle-web --features web
//! 接口:
//! - POST /api/chat   {"message": "...", "agent": "auto|coding|..."} -> {"response", "agent", "usage": {"tokens", "cost"}}
//!   非编码类回复经 format_structured_response 按行整理
//! - GET  /api/usage  用量快照
//! - GET  /api/health

#![cfg(feature = "web")]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use waggle::agent::AgentRuntime;
use waggle::agents::{format_structured_response, AgentKind};
use waggle::config::load_config;
use waggle::usage::UsageSnapshot;

struct AppState {
    runtime: AgentRuntime,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    /// 缺省或 "auto" 时自动路由
    #[serde(default)]
    agent: Option<String>,
}

#[derive(Serialize)]
struct UsageInfo {
    tokens: u64,
    cost: f64,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
    agent: AgentKind,
    usage: UsageInfo,
}

fn requested_agent(agent: Option<&str>) -> Result<Option<AgentKind>, (StatusCode, String)> {
    match agent.map(str::trim).filter(|a| !a.is_empty()) {
        None | Some("auto") => Ok(None),
        Some(name) => name
            .parse::<AgentKind>()
            .map(Some)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string())),
    }
}

async fn api_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message is required".to_string()));
    }
    let agent = requested_agent(req.agent.as_deref())?;

    let outcome = state.runtime.process_query(message, agent).await;
    Ok(Json(ChatResponse {
        usage: UsageInfo {
            tokens: outcome.tokens,
            cost: state.runtime.cost_of(outcome.tokens),
        },
        response: format_structured_response(&outcome.response, outcome.agent),
        agent: outcome.agent,
    }))
}

async fn api_usage(State(state): State<Arc<AppState>>) -> Json<UsageSnapshot> {
    Json(state.runtime.usage_snapshot().unwrap_or_default())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    waggle::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let runtime = AgentRuntime::from_config(&cfg).context("Failed to create agent runtime")?;
    let state = Arc::new(AppState { runtime });

    let app = Router::new()
        .route("/api/chat", post(api_chat))
        .route("/api/usage", get(api_usage))
        .route("/api/health", get(|| async { "OK" }))
        .with_state(Arc::clone(&state));

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.web.port));
    tracing::info!("Waggle web listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
