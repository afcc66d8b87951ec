use std::sync::Arc;

use axum::{extract::State, response::Json};
use tracing::info;

use crate::error::AppResult;
use crate::models::{BackendHealth, HealthResponse};
use crate::services::{extractor, LocalProcessBackend};
use crate::state::AppState;

/// Health check endpoint. Reports whether each backend could be used right now.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> AppResult<Json<HealthResponse>> {
    info!("Health check requested");

    let ollama_available = LocalProcessBackend::from_config(&state.config)
        .is_available()
        .await;
    let gemini_credential_present = state.credentials.gemini_api_key().is_some();

    let status = if ollama_available || gemini_credential_present {
        "healthy"
    } else {
        "degraded"
    };

    info!(
        status = status,
        ollama_available = ollama_available,
        gemini_credential_present = gemini_credential_present,
        pdf_supported = extractor::pdf_supported(),
        "Health check completed"
    );

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        backends: BackendHealth {
            ollama_available,
            gemini_credential_present,
        },
    }))
}
