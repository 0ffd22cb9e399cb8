//! HTTP request handlers

use crate::api::AppContext;
use crate::board::EntryView;
use crate::clips::parse_clip_id;
use crate::error::{ApiError, ApiResult};
use crate::generation::GenerationReport;
use crate::preview::PreviewOutcome;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use voicedeck_common::voices::{Voice, VOICES};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    audio_output: bool,
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    voices: Vec<Voice>,
    selected: String,
    previewing: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectVoiceRequest {
    voice_id: String,
}

#[derive(Debug, Serialize)]
pub struct SelectVoiceResponse {
    selected: String,
}

#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    entries: Vec<EntryView>,
    generating: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    count: usize,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    voice_id: String,
    report: GenerationReport,
    entries: Vec<EntryView>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "voicedeck-studio".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        audio_output: ctx.state.output.is_initialized(),
    })
}

/// GET /voices
pub async fn list_voices(State(ctx): State<AppContext>) -> Json<VoicesResponse> {
    Json(VoicesResponse {
        voices: VOICES.to_vec(),
        selected: ctx.state.selected_voice().await,
        previewing: ctx.state.preview.previewing(),
    })
}

/// POST /voice
pub async fn select_voice(
    State(ctx): State<AppContext>,
    Json(req): Json<SelectVoiceRequest>,
) -> ApiResult<Json<SelectVoiceResponse>> {
    ctx.state.select_voice(&req.voice_id).await?;
    info!(voice_id = %req.voice_id, "Voice selected");
    Ok(Json(SelectVoiceResponse {
        selected: req.voice_id,
    }))
}

/// POST /voices/:voice_id/preview
pub async fn preview_voice(
    State(ctx): State<AppContext>,
    Path(voice_id): Path<String>,
) -> ApiResult<Json<PreviewOutcome>> {
    let outcome = ctx.state.preview.preview(&voice_id).await?;
    Ok(Json(outcome))
}

/// GET /entries
pub async fn get_entries(State(ctx): State<AppContext>) -> Json<EntriesResponse> {
    Json(entries_response(&ctx).await)
}

/// POST /entries/count
pub async fn resize_entries(
    State(ctx): State<AppContext>,
    Json(req): Json<ResizeRequest>,
) -> Json<EntriesResponse> {
    let count = ctx.state.resize_entries(req.count).await;
    info!(requested = req.count, count, "Entry board resized");
    Json(entries_response(&ctx).await)
}

/// PUT /entries/:index
pub async fn update_entry(
    State(ctx): State<AppContext>,
    Path(index): Path<usize>,
    Json(req): Json<UpdateEntryRequest>,
) -> ApiResult<Json<EntryView>> {
    let mut board = ctx.state.board.write().await;
    board.set_text(index, req.text)?;
    let view = board
        .views()
        .into_iter()
        .nth(index)
        .ok_or_else(|| ApiError::Internal(format!("Entry {} vanished after update", index)))?;
    Ok(Json(view))
}

/// POST /generate
pub async fn generate(State(ctx): State<AppContext>) -> ApiResult<Json<GenerateResponse>> {
    let voice_id = ctx.state.selected_voice().await;
    let report = ctx.state.generator.generate_all(&voice_id).await?;
    let entries = ctx.state.board.read().await.views();
    Ok(Json(GenerateResponse {
        voice_id,
        report,
        entries,
    }))
}

/// GET /clips/:file
pub async fn get_clip(
    State(ctx): State<AppContext>,
    Path(file): Path<String>,
) -> ApiResult<Response> {
    let id = parse_clip_id(&file).ok_or_else(|| ApiError::NotFound(format!("Clip {}", file)))?;
    let bytes = ctx
        .state
        .clips
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Clip {}", file)))?;

    Ok(([(header::CONTENT_TYPE, "audio/wav")], bytes).into_response())
}

async fn entries_response(ctx: &AppContext) -> EntriesResponse {
    EntriesResponse {
        entries: ctx.state.board.read().await.views(),
        generating: ctx.state.generator.is_running(),
    }
}
