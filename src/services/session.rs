use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::error::ExtractionError;
use crate::models::{ExtractedDocument, ModelChoice, UploadedFile};
use crate::services::backend::{AnswerRequest, AnswerResult, Backends};
use crate::services::extractor;

/// Where a session stands after the last user action.
///
/// Uploading and answering also pass through transient "file uploaded" and
/// "answer pending" steps, which only exist while [`Session::upload`] and
/// [`Session::analyze`] are running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Extracted(Result<ExtractedDocument, ExtractionError>),
    AnswerReady(AnswerReady),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReady {
    pub document: ExtractedDocument,
    pub choice: ModelChoice,
    /// The question exactly as the user typed it.
    pub question: String,
    pub answer: AnswerResult,
}

/// One user's pass through upload, extraction and answering.
pub struct Session {
    backends: Backends,
    upload_dir: Option<PathBuf>,
    state: SessionState,
}

impl Session {
    pub fn new(backends: Backends, upload_dir: Option<PathBuf>) -> Self {
        Self {
            backends,
            upload_dir,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The extracted document, if the last upload produced usable text.
    pub fn document(&self) -> Option<&ExtractedDocument> {
        match &self.state {
            SessionState::Extracted(Ok(document)) => Some(document),
            SessionState::AnswerReady(ready) => Some(&ready.document),
            _ => None,
        }
    }

    /// Stage the upload in a scoped temp file, extract its text, and drop the
    /// temp file whatever the outcome. Replaces any earlier document.
    pub async fn upload(&mut self, file: UploadedFile) -> &SessionState {
        tracing::info!(
            file_name = %file.name,
            file_size = file.size,
            "Document uploaded"
        );

        let result = self.extract_upload(file).await;
        self.state = SessionState::Extracted(result);
        &self.state
    }

    async fn extract_upload(&self, file: UploadedFile) -> Result<ExtractedDocument, ExtractionError> {
        let staged = self.stage(&file)?;
        let kind = file.kind();

        tracing::debug!(path = %staged.path().display(), kind = ?kind, "Upload staged for extraction");

        // `staged` moves into the blocking task and is deleted there when the
        // extraction returns or unwinds.
        let text = tokio::task::spawn_blocking(move || {
            let result = extractor::extract(staged.path(), kind);
            drop(staged);
            result
        })
        .await
        .map_err(|e| ExtractionError::Read(format!("extraction task failed: {}", e)))??;

        if text.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }

        Ok(ExtractedDocument {
            file_name: file.name,
            kind,
            text,
        })
    }

    fn stage(&self, file: &UploadedFile) -> Result<NamedTempFile, ExtractionError> {
        let suffix = file.suffix();
        let mut builder = tempfile::Builder::new();
        builder.prefix("docqa-upload-").suffix(&suffix);

        let mut staged = match &self.upload_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        staged.write_all(&file.content)?;
        staged.flush()?;
        Ok(staged)
    }

    /// Answer `question` against the current document with the chosen backend.
    ///
    /// Does nothing and returns `None` when there is no usable document or the
    /// question is blank.
    pub async fn analyze(&mut self, question: &str, choice: ModelChoice) -> Option<&AnswerReady> {
        if question.trim().is_empty() {
            tracing::debug!("Analyze requested with a blank question, ignoring");
            return None;
        }

        let Some(document) = self.document().cloned() else {
            tracing::debug!("Analyze requested without an extracted document, ignoring");
            return None;
        };

        let backend = self.backends.select(choice);
        tracing::info!(
            backend = backend.name(),
            question_chars = question.chars().count(),
            "Dispatching question"
        );

        let request = AnswerRequest::new(question, &document.text);
        let answer = backend.answer(&request).await;

        if let Err(e) = &answer {
            tracing::warn!(
                backend = backend.name(),
                error_code = e.error_code(),
                error = %e,
                "Backend returned an error"
            );
        }

        self.state = SessionState::AnswerReady(AnswerReady {
            document,
            choice,
            question: question.to_string(),
            answer,
        });

        match &self.state {
            SessionState::AnswerReady(ready) => Some(ready),
            _ => None,
        }
    }
}
