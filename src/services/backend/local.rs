use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{AnswerBackend, AnswerFuture, AnswerRequest, AnswerResult};
use crate::config::Config;
use crate::error::AnswerError;

/// Runs a local model runtime as a child process: prompt on stdin, answer on
/// stdout. One attempt per question, bounded by a wall-clock timeout.
#[derive(Debug, Clone)]
pub struct LocalProcessBackend {
    program: OsString,
    args: Vec<OsString>,
    timeout: Duration,
}

impl LocalProcessBackend {
    pub fn new<P, I, A>(program: P, args: I, timeout: Duration) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    /// `<command> run <model>`.
    pub fn ollama(command: &str, model: &str, timeout: Duration) -> Self {
        Self::new(command, ["run", model], timeout)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::ollama(&config.ollama_command, &config.ollama_model, config.ollama_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the runtime executable can be spawned at all.
    pub async fn is_available(&self) -> bool {
        let probe = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        matches!(
            tokio::time::timeout(Duration::from_secs(5), probe).await,
            Ok(Ok(_))
        )
    }

    async fn run(&self, prompt: String) -> std::io::Result<Output> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(prompt.as_bytes()).await {
                Ok(()) => {}
                // The child quit without reading its input; its exit status decides.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    tracing::debug!("Local model closed stdin before reading the prompt");
                }
                Err(e) => return Err(e),
            }
        }

        child.wait_with_output().await
    }

    async fn answer_inner(&self, request: &AnswerRequest) -> AnswerResult {
        let start = Instant::now();
        let prompt = request.prompt();

        tracing::info!(
            program = ?self.program,
            prompt_chars = prompt.chars().count(),
            timeout_secs = self.timeout.as_secs(),
            "Invoking local model"
        );

        let output = match tokio::time::timeout(self.timeout, self.run(prompt)).await {
            Err(_) => {
                tracing::warn!(elapsed_ms = start.elapsed().as_millis() as u64, "Local model timed out");
                return Err(AnswerError::OllamaTimeout);
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(program = ?self.program, "Local model executable not found");
                return Err(AnswerError::OllamaNotFound);
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Local model invocation failed");
                return Err(AnswerError::Ollama(e.to_string()));
            }
            Ok(Ok(output)) => output,
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                status = %output.status,
                elapsed_ms = elapsed_ms,
                "Local model exited unsuccessfully"
            );
            return Err(AnswerError::from_stderr(&stderr));
        }

        let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::info!(
            answer_chars = answer.chars().count(),
            elapsed_ms = elapsed_ms,
            "Local model answered"
        );
        Ok(answer)
    }
}

impl AnswerBackend for LocalProcessBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn answer<'a>(&'a self, request: &'a AnswerRequest) -> AnswerFuture<'a> {
        Box::pin(self.answer_inner(request))
    }
}
