use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    response::Json,
};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{ModelChoice, SessionResponse, UploadedFile};
use crate::services::Session;
use crate::state::AppState;

/// Fields of the page's multipart form.
#[derive(Debug)]
pub struct SessionForm {
    pub file: UploadedFile,
    pub model: ModelChoice,
    pub question: String,
    /// Set when the "Analyze Document" trigger was pressed.
    pub analyze: bool,
}

/// Run one user action top to bottom: extract the uploaded document and,
/// when the analyze trigger is set with a non-blank question, answer it.
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<SessionResponse>> {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

    info!(request_id = %request_id, "Starting document session request");

    let form = match parse_session_form(multipart, state.config.max_file_size_mb).await {
        Ok(form) => {
            info!(
                request_id = %request_id,
                file_name = %form.file.name,
                file_size = form.file.size,
                model = ?form.model,
                analyze = form.analyze,
                "Session form parsed"
            );
            form
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Failed to parse session form");
            return Err(e);
        }
    };

    let mut session = Session::new(state.backends.clone(), state.config.upload_dir.clone());
    session.upload(form.file).await;

    if form.analyze && session.analyze(&form.question, form.model).await.is_none() {
        debug!(request_id = %request_id, "Analyze trigger set but nothing to answer");
    }

    let total_time = start.elapsed().as_millis() as u64;
    let response = SessionResponse::from_state(session.state(), total_time);

    info!(
        request_id = %request_id,
        stage = ?response.stage,
        total_time_ms = total_time,
        "Session request completed"
    );

    Ok(Json(response))
}

pub async fn parse_session_form(mut multipart: Multipart, max_file_size_mb: usize) -> AppResult<SessionForm> {
    let mut file: Option<UploadedFile> = None;
    let mut model = ModelChoice::default();
    let mut question = String::new();
    let mut analyze = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_file(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.txt").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::invalid_file(format!("Failed to read file data: {}", e)))?;

                let max_size_bytes = max_file_size_mb * 1024 * 1024;
                if data.len() > max_size_bytes {
                    warn!(
                        file_size = data.len(),
                        max_size = max_size_bytes,
                        "File size exceeds limit"
                    );
                    return Err(AppError::FileTooLarge {
                        size: data.len() / (1024 * 1024),
                        limit: max_file_size_mb,
                    });
                }

                file = Some(UploadedFile::new(file_name, data));
            }
            "model" => {
                let value = read_text(field, "model").await?;
                model = value.parse::<ModelChoice>().map_err(AppError::validation)?;
            }
            "question" => {
                question = read_text(field, "question").await?;
            }
            "analyze" => {
                let value = read_text(field, "analyze").await?;
                analyze = matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on");
            }
            other => {
                debug!(field = other, "Ignoring unknown form field");
                let _ = field.bytes().await;
            }
        }
    }

    let file = file.ok_or(AppError::MissingFile)?;

    Ok(SessionForm {
        file,
        model,
        question,
        analyze,
    })
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::invalid_file(format!("Failed to read {}: {}", name, e)))
}
