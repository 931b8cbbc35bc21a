//! HTTP API for the draft server.
//!
//! Every endpoint is a thin adapter over [`DraftManager`]: it parses the
//! request, calls one manager operation and maps the result or the
//! [`DraftError`](draft_engine::DraftError) to a response.
//!
//! # Endpoints Overview
//!
//! ## Sessions
//! - `GET /api/v1/draft/sessions` - List session summaries
//! - `POST /api/v1/draft/session` - Create a session
//! - `GET /api/v1/draft/session/{id}` - Current session state
//! - `POST /api/v1/draft/session/{id}/action` - Submit a pick or ban
//!
//! ## Analysis
//! - `GET /api/v1/draft/session/{id}/suggestions?team=blue` - Ranked suggestions
//! - `GET /api/v1/draft/session/{id}/analysis?team=red` - Team composition
//! - `GET /api/v1/draft/session/{id}/prediction` - Win prediction
//!
//! ## Health Check
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use draft_engine::{DraftManager, ManagerConfig, StaticCatalog};
//! use draft_server::api::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(StaticCatalog::sample()?);
//! let state = AppState {
//!     manager: Arc::new(DraftManager::with_catalog(ManagerConfig::default(), catalog)),
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod drafts;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use draft_engine::DraftManager;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::metrics;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<DraftManager>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET  /health                                   - Health check
/// GET  /api/v1/draft/sessions                    - List sessions
/// POST /api/v1/draft/session                     - Create session
/// GET  /api/v1/draft/session/{id}                - Get session
/// POST /api/v1/draft/session/{id}/action         - Submit action
/// GET  /api/v1/draft/session/{id}/suggestions    - Suggestions (?team=)
/// GET  /api/v1/draft/session/{id}/analysis       - Composition (?team=)
/// GET  /api/v1/draft/session/{id}/prediction     - Win prediction
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router())
        .route_layer(axum::middleware::from_fn(metrics::track_http))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router() -> Router<AppState> {
    let session_routes = Router::new()
        .route("/sessions", get(drafts::list_sessions))
        .route("/session", post(drafts::create_session))
        .route("/session/{session_id}", get(drafts::get_session))
        .route("/session/{session_id}/action", post(drafts::submit_action))
        .route(
            "/session/{session_id}/suggestions",
            get(drafts::get_suggestions),
        )
        .route("/session/{session_id}/analysis", get(drafts::get_analysis))
        .route(
            "/session/{session_id}/prediction",
            get(drafts::get_prediction),
        );

    Router::new().nest("/draft", session_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"0.1.0","sessions":3,"timestamp":"2026-10-19T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.manager.session_count().await;
    metrics::active_sessions(sessions);

    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": sessions,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
