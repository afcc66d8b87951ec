use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::models::DocumentKind;

/// Which answer backend the user picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    /// Local model run as a child process.
    #[default]
    Ollama,
    /// Cloud API model.
    Gemini,
}

impl ModelChoice {
    pub fn label(&self) -> &'static str {
        match self {
            ModelChoice::Ollama => "Ollama (Offline)",
            ModelChoice::Gemini => "Gemini (Free Cloud)",
        }
    }
}

impl std::str::FromStr for ModelChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "ollama" => Ok(ModelChoice::Ollama),
            "gemini" => Ok(ModelChoice::Gemini),
            other => Err(format!("unknown model choice '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size: usize,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len(),
            content,
        }
    }

    /// Extension of the original file name including the dot, e.g. `.pdf`.
    /// Empty when the name has none.
    pub fn suffix(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default()
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_path(Path::new(&self.name))
    }
}
