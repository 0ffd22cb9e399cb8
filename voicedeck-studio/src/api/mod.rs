//! HTTP API for the studio
//!
//! JSON endpoints for the voice catalog, the entry board, batch generation
//! and voice preview, plus WAV clip serving and an SSE event stream.

pub mod handlers;
pub mod server;
pub mod sse;

use crate::state::StudioState;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use server::run;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<StudioState>,
}

/// Create the API router
pub fn create_router(state: Arc<StudioState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Voice catalog
        .route("/voices", get(handlers::list_voices))
        .route("/voice", post(handlers::select_voice))
        .route("/voices/:voice_id/preview", post(handlers::preview_voice))
        // Entry board
        .route("/entries", get(handlers::get_entries))
        .route("/entries/count", post(handlers::resize_entries))
        .route("/entries/:index", put(handlers::update_entry))
        .route("/generate", post(handlers::generate))
        // Generated audio
        .route("/clips/:file", get(handlers::get_clip))
        // SSE event stream
        .route("/events", get(sse::event_stream))
        .with_state(AppContext { state })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
