use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type AppResult<T> = Result<T, AppError>;

/// Request-level failures. These reject the HTTP request itself; extraction and
/// answering failures are reported inside a successful response instead.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("File too large: {size}MB exceeds limit of {limit}MB")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Invalid upload: {message}")]
    InvalidFile { message: String },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::InvalidFile { .. } => "INVALID_FILE",
            AppError::MissingFile => "MISSING_FILE",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InvalidFile { .. } => StatusCode::BAD_REQUEST,
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();
        let request_id = Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().to_rfc3339();

        tracing::error!(
            error_code = error_code,
            status_code = %status,
            request_id = %request_id,
            error_message = %message,
            "API error occurred"
        );

        let body = Json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
                "request_id": request_id,
                "timestamp": timestamp
            },
            "data": null
        }));

        (status, body).into_response()
    }
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
        }
    }

    pub fn invalid_file(message: impl Into<String>) -> Self {
        AppError::InvalidFile {
            message: message.into(),
        }
    }
}

/// Why a document produced no usable text. `Display` is the message shown to
/// the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Unsupported file type.")]
    Unsupported,

    #[error("pdf-extract not installed. Rebuild with: cargo build --features pdf")]
    PdfUnavailable,

    #[error("No text could be extracted from the document.")]
    Empty,

    #[error("Error reading file: {0}")]
    Read(String),
}

impl From<std::io::Error> for ExtractionError {
    fn from(err: std::io::Error) -> Self {
        ExtractionError::Read(err.to_string())
    }
}

/// Why a backend produced no answer. `Display` is the message shown to the
/// user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnswerError {
    #[error("Ollama not found. Install and run Ollama.")]
    OllamaNotFound,

    #[error("Ollama request timed out.")]
    OllamaTimeout,

    /// Non-zero exit; carries trimmed stderr or the generic failure text.
    #[error("{0}")]
    OllamaFailed(String),

    #[error("Ollama error: {0}")]
    Ollama(String),

    #[error("GEMINI_API_KEY not found in environment variables.")]
    MissingCredential,

    #[error("Gemini error: {0}")]
    Gemini(String),
}

impl AnswerError {
    pub const OLLAMA_EXECUTION_FAILED: &'static str = "Ollama execution failed.";

    /// Map a non-zero exit to an error, falling back to the generic message
    /// when the process wrote nothing useful to stderr.
    pub fn from_stderr(stderr: &str) -> Self {
        let stderr = stderr.trim();
        if stderr.is_empty() {
            AnswerError::OllamaFailed(Self::OLLAMA_EXECUTION_FAILED.to_string())
        } else {
            AnswerError::OllamaFailed(stderr.to_string())
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AnswerError::OllamaNotFound => "OLLAMA_NOT_FOUND",
            AnswerError::OllamaTimeout => "OLLAMA_TIMEOUT",
            AnswerError::OllamaFailed(_) => "OLLAMA_FAILED",
            AnswerError::Ollama(_) => "OLLAMA_ERROR",
            AnswerError::MissingCredential => "MISSING_CREDENTIAL",
            AnswerError::Gemini(_) => "GEMINI_ERROR",
        }
    }
}
