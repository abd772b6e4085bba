pub mod errors;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use errors::ApiError;
use faq_core::{Engine, Stats};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub probability: f64,
    pub lemmatized_tokens: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFaqRequest {
    pub topic: String,
    pub answer: String,
    pub references: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditTopicRequest {
    pub answer: String,
    pub references: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
    /// Index version that includes the change.
    pub version: u64,
}

#[derive(Debug, Serialize)]
pub struct TopicResponse {
    pub topic: String,
    pub answer: String,
    pub references: Vec<String>,
}

/// Settings read from the environment at startup.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// When set, mutating routes require a matching `X-ADMIN-TOKEN` header.
    pub admin_token: Option<String>,
    /// Comma-separated list of allowed origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub admin_token: Option<String>,
}

pub fn build_app(engine: Arc<Engine>, config: AppConfig) -> Router {
    let cors = match config.cors_allow_origin {
        Some(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let state = AppState { engine, admin_token: config.admin_token };
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/chat", post(chat_handler))
        .route("/add_faq", post(add_faq_handler))
        .route("/topics", get(list_topics_handler))
        .route("/topics/:name", get(get_topic_handler).put(edit_topic_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload?;
    let answer = state.engine.answer(&req.message)?;
    Ok(Json(ChatResponse { reply: answer.reply, probability: answer.score, lemmatized_tokens: answer.lemmas }))
}

pub async fn add_faq_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AddFaqRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>, ApiError> {
    authorize(&state, &headers)?;
    let Json(req) = payload?;
    let engine = state.engine.clone();
    // store write plus full rebuild; keep it off the async workers
    let version =
        tokio::task::spawn_blocking(move || engine.upsert_topic(&req.topic, &req.answer, &req.references)).await??;
    Ok(Json(MutationResponse { success: true, message: "FAQ added/updated successfully".into(), version }))
}

pub async fn edit_topic_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    payload: Result<Json<EditTopicRequest>, JsonRejection>,
) -> Result<Json<MutationResponse>, ApiError> {
    authorize(&state, &headers)?;
    let Json(req) = payload?;
    let engine = state.engine.clone();
    let version = tokio::task::spawn_blocking(move || engine.edit_topic(&name, &req.answer, &req.references)).await??;
    Ok(Json(MutationResponse { success: true, message: "FAQ updated successfully".into(), version }))
}

pub async fn list_topics_handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let topics = state.engine.topic_names()?;
    Ok(Json(serde_json::json!({ "topics": topics })))
}

pub async fn get_topic_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TopicResponse>, ApiError> {
    let topic = state.engine.topic(&name)?;
    Ok(Json(TopicResponse { topic: topic.name, answer: topic.answer, references: topic.references }))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<Stats> {
    Json(state.engine.stats())
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(required) = &state.admin_token else { return Ok(()) };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("invalid admin token".into()))
    }
}
