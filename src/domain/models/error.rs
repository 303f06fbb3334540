use thiserror::Error;

/// Errors surfaced to the user at the orchestrator and poller boundaries.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("{0}")]
    Validation(String),

    #[error("The generation backend could not be reached: {0}")]
    Transport(String),

    #[error("Skipped malformed stream frame: {0}")]
    StreamParse(String),

    #[error("Generation ended without producing any screens: {0}")]
    TerminalGeneration(String),

    #[error("Build {build_id} failed: {message}")]
    BuildJob { build_id: String, message: String },
}

impl BuilderError {
    pub fn is_retryable(&self) -> bool {
        return matches!(
            self,
            BuilderError::Transport(_) | BuilderError::TerminalGeneration(_)
        );
    }

    /// Maps any backend failure onto the taxonomy. Errors already in the
    /// taxonomy pass through, everything else is a transport failure.
    pub fn from_anyhow(err: anyhow::Error) -> BuilderError {
        if let Some(builder_err) = err.downcast_ref::<BuilderError>() {
            return builder_err.clone();
        }

        if let Some(req_err) = err.downcast_ref::<reqwest::Error>() {
            return BuilderError::Transport(req_err.to_string());
        }

        return BuilderError::Transport(format!("{err:#}"));
    }
}
