//! API Routes
//!
//! - `/` - the single-page UI
//! - `/api/analyze` - upload a document and optionally ask a question
//! - `/api/health` - health check

pub mod analyze;
pub mod health;
pub mod ui;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let max_upload = state.config.server.max_upload_bytes;
    let origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(analyze::router(state))
        .merge(health::router())
        .merge(ui::router())
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &origins)
}
