use std::sync::Arc;

use crate::config::{Config, CredentialSource, EnvCredentials};
use crate::services::{Backends, CloudApiBackend, LocalProcessBackend};

/// Immutable per-process state shared by all handlers.
pub struct AppState {
    pub config: Config,
    pub backends: Backends,
    pub credentials: Arc<dyn CredentialSource>,
}

impl AppState {
    pub fn new(config: Config, backends: Backends, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            config,
            backends,
            credentials,
        }
    }

    /// Production wiring: `ollama` subprocess plus Gemini over HTTPS, with the
    /// API key read from the environment at call time.
    pub fn from_config(config: Config) -> Self {
        let credentials: Arc<dyn CredentialSource> = Arc::new(EnvCredentials);
        let backends = Backends::new(
            Arc::new(LocalProcessBackend::from_config(&config)),
            Arc::new(CloudApiBackend::from_config(&config, credentials.clone())),
        );
        Self::new(config, backends, credentials)
    }
}
