//! Portrait generation endpoint.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use moodverse_core::{PortraitError, PortraitReading, generate_portrait, validation};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::AppState;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct PortraitResponse {
    pub success: bool,
    pub reading: PortraitReading,
}

/// `POST /api/generate-portrait` — validate, call the provider, relay the reading.
pub async fn generate_portrait_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PortraitResponse>> {
    let Json(body) = body?;
    let portrait = validation::validate(&body)?;

    info!(mood = %portrait.mood, energy = portrait.energy, "generating portrait");

    let reading = generate_portrait(state.completions.as_ref(), &portrait)
        .await
        .inspect_err(log_failure)?;

    Ok(Json(PortraitResponse {
        success: true,
        reading,
    }))
}

fn log_failure(err: &PortraitError) {
    match err {
        PortraitError::Upstream { status, detail } => {
            error!(status = ?status, detail = %detail, "upstream provider error");
        }
        PortraitError::Parse(msg) => error!("model reply is not valid JSON: {msg}"),
        PortraitError::Internal(msg) => error!("portrait generation failed: {msg}"),
        PortraitError::InvalidInput(_) => {}
    }
}
