use std::env;

pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Source of the cloud API credential, consulted at call time rather than at
/// startup so that a missing key is a per-request condition.
pub trait CredentialSource: Send + Sync {
    fn gemini_api_key(&self) -> Option<String>;
}

/// Reads `GEMINI_API_KEY` from the process environment on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn gemini_api_key(&self) -> Option<String> {
        env::var(GEMINI_API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Fixed credential, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    key: Option<String>,
}

impl StaticCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    pub fn missing() -> Self {
        Self { key: None }
    }
}

impl CredentialSource for StaticCredentials {
    fn gemini_api_key(&self) -> Option<String> {
        self.key.clone().filter(|key| !key.trim().is_empty())
    }
}
