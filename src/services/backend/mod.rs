//! Answer backends: a uniform `(question, context) -> answer` contract over a
//! local model process and a cloud API.

pub mod cloud;
pub mod local;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::AnswerError;
use crate::models::ModelChoice;

pub use cloud::{CloudApiBackend, ContentTransport, GeminiHttpTransport};
pub use local::LocalProcessBackend;

/// Maximum number of characters of document text sent to any backend.
pub const CONTEXT_CHAR_LIMIT: usize = 3000;

pub type AnswerResult = Result<String, AnswerError>;

pub type AnswerFuture<'a> = Pin<Box<dyn Future<Output = AnswerResult> + Send + 'a>>;

/// A question plus the document text it should be answered from. The context
/// is truncated on construction, so every backend sees at most
/// [`CONTEXT_CHAR_LIMIT`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRequest {
    question: String,
    context: String,
}

impl AnswerRequest {
    pub fn new(question: impl Into<String>, context: &str) -> Self {
        Self {
            question: question.into(),
            context: truncate_chars(context, CONTEXT_CHAR_LIMIT).to_string(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn prompt(&self) -> String {
        format!(
            "You are a helpful AI assistant. Answer the question strictly using the document content.\n\n\
             Document Content:\n{}\n\n\
             Question:\n{}\n\n\
             Answer clearly based only on the document.",
            self.context, self.question
        )
    }
}

/// First `limit` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Something that turns an [`AnswerRequest`] into an answer.
///
/// Implementations catch every failure of their transport and report it as an
/// [`AnswerError`]; nothing is retried.
pub trait AnswerBackend: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    fn answer<'a>(&'a self, request: &'a AnswerRequest) -> AnswerFuture<'a>;
}

/// The two backends the user can choose between.
#[derive(Clone)]
pub struct Backends {
    pub local: Arc<dyn AnswerBackend>,
    pub cloud: Arc<dyn AnswerBackend>,
}

impl Backends {
    pub fn new(local: Arc<dyn AnswerBackend>, cloud: Arc<dyn AnswerBackend>) -> Self {
        Self { local, cloud }
    }

    pub fn select(&self, choice: ModelChoice) -> &dyn AnswerBackend {
        match choice {
            ModelChoice::Ollama => self.local.as_ref(),
            ModelChoice::Gemini => self.cloud.as_ref(),
        }
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("local", &self.local.name())
            .field("cloud", &self.cloud.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_context_is_untouched() {
        let request = AnswerRequest::new("q", "short");
        assert_eq!(request.context(), "short");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let context = "é".repeat(CONTEXT_CHAR_LIMIT + 5);
        let request = AnswerRequest::new("q", &context);
        assert_eq!(request.context().chars().count(), CONTEXT_CHAR_LIMIT);
        assert_eq!(request.context().len(), CONTEXT_CHAR_LIMIT * 2);
    }

    #[test]
    fn prompt_contains_document_then_question() {
        let prompt = AnswerRequest::new("what is this?", "hello docs").prompt();
        let doc_at = prompt.find("hello docs").unwrap();
        let question_at = prompt.find("what is this?").unwrap();
        assert!(doc_at < question_at);
        assert!(prompt.contains("only"));
    }
}
