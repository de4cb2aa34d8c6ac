use axum::{Json, Router, extract::{Path, State}, http::StatusCode, routing::{get, post, patch}};
use std::{collections::HashMap, sync::Arc, time::Duration};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::json;
use tower_http::cors::{CorsLayer, Any};
use uuid::Uuid;

use crate::{assets, curator::{Curator, Rejected}, gemini::Stylist, models::{CriteriaPatch, StyleOptions}, view::{render, ViewModel}};

pub type Sessions = Arc<RwLock<HashMap<Uuid, Curator>>>;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Sessions,
    pub stylist: Arc<dyn Stylist>,
}

impl AppState {
    pub fn new(stylist: Arc<dyn Stylist>) -> Self {
        Self { sessions: Arc::default(), stylist }
    }
}

/// Drops sessions not touched since `now - ttl`. Returns how many were removed.
pub fn evict_idle(sessions: &Sessions, ttl: Duration, now: DateTime<Utc>) -> usize {
    let Ok(ttl) = chrono::Duration::from_std(ttl) else { return 0 };
    let cutoff = now - ttl;
    let mut guard = sessions.write();
    let before = guard.len();
    guard.retain(|_, curator| curator.updated_at() > cutoff);
    before - guard.len()
}

/// Periodically evicts idle sessions; tabs that vanish without a DELETE are reclaimed here.
pub fn spawn_sweeper(sessions: Sessions, ttl: Duration) -> tokio::task::JoinHandle<()> {
    let period = (ttl / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = evict_idle(&sessions, ttl, Utc::now());
            if evicted > 0 {
                tracing::info!("🧹 Evicted {} idle curation sessions", evicted);
            }
        }
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(assets::index))
        .route("/assets/*path", get(assets::asset))
        .route("/api/health", get(health))
        .route("/api/options", get(options))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/criteria", patch(update_criteria))
        .route("/api/sessions/:id/generate", post(generate))
        .route("/api/sessions/:id/reset", post(start_new_curation))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn options() -> Json<StyleOptions> {
    Json(StyleOptions::default())
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let id = Uuid::new_v4();
    let curator = Curator::new();
    let view = render(&curator);
    state.sessions.write().insert(id, curator);
    tracing::info!("🆕 Created curation session {}", id);
    (StatusCode::CREATED, Json(json!({ "id": id, "view": view })))
}

pub async fn get_session(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<ViewModel>, StatusCode> {
    let guard = state.sessions.read();
    guard.get(&id).map(|c| Json(render(c))).ok_or(StatusCode::NOT_FOUND)
}

pub async fn delete_session(Path(id): Path<Uuid>, State(state): State<AppState>) -> StatusCode {
    if state.sessions.write().remove(&id).is_some() {
        tracing::info!("👋 Discarded curation session {}", id);
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn update_criteria(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<CriteriaPatch>,
) -> Result<Json<ViewModel>, StatusCode> {
    let mut guard = state.sessions.write();
    let curator = guard.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    curator.update(body);
    Ok(Json(render(curator)))
}

/// Starts one background call to the stylist. Answers `202` with the loading view, or
/// the unchanged view with `409`/`422` when the session may not generate right now.
/// Criteria in the body are applied first, so the request uses what the page shows.
pub async fn generate(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    body: Option<Json<CriteriaPatch>>,
) -> Result<(StatusCode, Json<ViewModel>), StatusCode> {
    let (ticket, view) = {
        let mut guard = state.sessions.write();
        let curator = guard.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
        if let Some(Json(patch)) = body {
            curator.update(patch);
        }
        match curator.begin() {
            Ok(ticket) => (ticket, render(curator)),
            Err(reason) => {
                tracing::info!("⏸️ Generate ignored for session {}: {}", id, reason);
                let status = match reason {
                    Rejected::MissingOccasion => StatusCode::UNPROCESSABLE_ENTITY,
                    Rejected::AlreadyLoading | Rejected::ResultShowing => StatusCode::CONFLICT,
                };
                return Ok((status, Json(render(curator))));
            }
        }
    };

    tracing::info!("🚀 Generating outfit for session {} (occasion: {})", id, ticket.criteria.occasion);

    let sessions = state.sessions.clone();
    let stylist = state.stylist.clone();
    tokio::spawn(async move {
        let result = stylist.generate(&ticket.criteria).await;
        let mut guard = sessions.write();
        match guard.get_mut(&id) {
            Some(curator) => { curator.complete(&ticket, result); }
            None => tracing::info!("🗑️ Session {} was discarded before its result arrived", id),
        };
    });

    Ok((StatusCode::ACCEPTED, Json(view)))
}

pub async fn start_new_curation(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<ViewModel>, StatusCode> {
    let mut guard = state.sessions.write();
    let curator = guard.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    curator.start_new_curation();
    Ok(Json(render(curator)))
}
