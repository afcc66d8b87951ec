use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::{AnswerBackend, AnswerFuture, AnswerRequest, AnswerResult};
use crate::config::{Config, CredentialSource};
use crate::error::AnswerError;

/// Sends one prompt to a generative-content endpoint and returns the raw text.
/// Errors are plain strings; the backend wraps them for display.
pub trait ContentTransport: Send + Sync {
    fn generate<'a>(
        &'a self,
        api_key: &'a str,
        model: &'a str,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>>;
}

/// Cloud model backend. The credential is looked up on every call so that a
/// missing key is reported per question, never at startup.
pub struct CloudApiBackend {
    model: String,
    credentials: Arc<dyn CredentialSource>,
    transport: Arc<dyn ContentTransport>,
}

impl CloudApiBackend {
    pub fn new(
        model: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
        transport: Arc<dyn ContentTransport>,
    ) -> Self {
        Self {
            model: model.into(),
            credentials,
            transport,
        }
    }

    pub fn from_config(config: &Config, credentials: Arc<dyn CredentialSource>) -> Self {
        Self::new(
            config.gemini_model.clone(),
            credentials,
            Arc::new(GeminiHttpTransport::new(config.gemini_base_url.clone())),
        )
    }

    async fn answer_inner(&self, request: &AnswerRequest) -> AnswerResult {
        let Some(api_key) = self.credentials.gemini_api_key() else {
            tracing::warn!("Cloud model requested without a configured API key");
            return Err(AnswerError::MissingCredential);
        };

        let start = Instant::now();
        let prompt = request.prompt();

        tracing::info!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "Invoking cloud model"
        );

        match self.transport.generate(&api_key, &self.model, &prompt).await {
            Ok(text) => {
                let answer = text.trim().to_string();
                tracing::info!(
                    answer_chars = answer.chars().count(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Cloud model answered"
                );
                Ok(answer)
            }
            Err(cause) => {
                tracing::error!(
                    error = %cause,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Cloud model request failed"
                );
                Err(AnswerError::Gemini(cause))
            }
        }
    }
}

impl AnswerBackend for CloudApiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn answer<'a>(&'a self, request: &'a AnswerRequest) -> AnswerFuture<'a> {
        Box::pin(self.answer_inner(request))
    }
}

/// Gemini `generateContent` over HTTPS. A fresh client is built per call.
#[derive(Debug, Clone)]
pub struct GeminiHttpTransport {
    base_url: String,
}

impl GeminiHttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.trim_start_matches('/');
        if model.starts_with("models/") {
            format!("{}/{}:generateContent", self.base_url, model)
        } else {
            format!("{}/models/{}:generateContent", self.base_url, model)
        }
    }

    async fn generate_inner(&self, api_key: &str, model: &str, prompt: &str) -> Result<String, String> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| format!("failed to build HTTP client: {}", e))?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response = client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
                .map(|envelope| envelope.error.message)
                .unwrap_or(raw);
            return Err(format!("{} {}", status.as_u16(), message.trim()));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| format!("failed to decode response: {}", e))?;

        parsed.text()
    }
}

impl ContentTransport for GeminiHttpTransport {
    fn generate<'a>(
        &'a self,
        api_key: &'a str,
        model: &'a str,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>> {
        Box::pin(self.generate_inner(api_key, model, prompt))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated.
    pub fn text(&self) -> Result<String, String> {
        let text: Option<String> = self
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            });

        match text {
            Some(text) if !text.is_empty() => Ok(text),
            _ => match self
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref())
            {
                Some(reason) => Err(format!("prompt blocked: {}", reason)),
                None => Err("response contained no text".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_accepts_prefixed_and_bare_models() {
        let transport = GeminiHttpTransport::new("http://localhost:9000/v1beta/");
        assert_eq!(
            transport.endpoint("models/gemini-flash-latest"),
            "http://localhost:9000/v1beta/models/gemini-flash-latest:generateContent"
        );
        assert_eq!(
            transport.endpoint("gemini-flash-latest"),
            "http://localhost:9000/v1beta/models/gemini-flash-latest:generateContent"
        );
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"a "},{"text":"greeting"}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text().unwrap(), "a greeting");
    }

    #[test]
    fn blocked_prompt_reports_reason() {
        let raw = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text().unwrap_err(), "prompt blocked: SAFETY");
    }
}
