use serde::{Deserialize, Serialize};

use crate::services::session::SessionState;

/// What the page renders after one pass through the session.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// True when the document yielded text.
    pub success: bool,
    pub stage: SessionStage,
    pub document: Option<DocumentSummary>,
    pub error: Option<ErrorDetail>,
    pub question: Option<String>,
    pub answer: Option<AnswerView>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStage {
    Idle,
    ExtractionFailed,
    Extracted,
    Answered,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub file_name: String,
    pub characters: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerView {
    pub ok: bool,
    pub backend: String,
    /// The answer, or the failure reason when `ok` is false.
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub backends: BackendHealth,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendHealth {
    pub ollama_available: bool,
    pub gemini_credential_present: bool,
}

impl SessionResponse {
    pub fn from_state(state: &SessionState, processing_time_ms: u64) -> Self {
        let mut response = SessionResponse {
            success: false,
            stage: SessionStage::Idle,
            document: None,
            error: None,
            question: None,
            answer: None,
            processing_time_ms,
        };

        match state {
            SessionState::Idle => {}
            SessionState::Extracted(Err(err)) => {
                response.stage = SessionStage::ExtractionFailed;
                response.error = Some(ErrorDetail {
                    code: "EXTRACTION_FAILED".to_string(),
                    message: err.to_string(),
                });
            }
            SessionState::Extracted(Ok(document)) => {
                response.success = true;
                response.stage = SessionStage::Extracted;
                response.document = Some(DocumentSummary {
                    file_name: document.file_name.clone(),
                    characters: document.char_count(),
                });
            }
            SessionState::AnswerReady(ready) => {
                response.success = true;
                response.stage = SessionStage::Answered;
                response.document = Some(DocumentSummary {
                    file_name: ready.document.file_name.clone(),
                    characters: ready.document.char_count(),
                });
                response.question = Some(ready.question.clone());
                response.answer = Some(AnswerView {
                    ok: ready.answer.is_ok(),
                    backend: ready.choice.label().to_string(),
                    text: match &ready.answer {
                        Ok(answer) => answer.clone(),
                        Err(err) => err.to_string(),
                    },
                });
            }
        }

        response
    }
}
