use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("{tool} is not available and could not be installed: {reason}")]
    DependencyUnavailable { tool: String, reason: String },

    #[error("Failed to launch {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("{program} exited with {status}")]
    NonZeroExit { program: String, status: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    /// Fatal errors stop the whole batch; the rest only fail a single job.
    pub fn is_fatal(&self) -> bool {
        match self {
            AppError::DependencyUnavailable { .. } | AppError::Io(_) | AppError::Config(_) => true,
            AppError::Spawn { .. } | AppError::NonZeroExit { .. } => false,
        }
    }
}

/// Conditions worth telling the user about that never abort a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// The browser cookie database could not be read, usually because the
    /// browser is still running and holds a lock on it.
    CookieStoreInaccessible,
    /// ffmpeg is missing; merging and HLS fragments will not work.
    MediaToolMissing,
}
