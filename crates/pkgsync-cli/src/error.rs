//! Error types for pkgsync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from pkgsync-core
    #[error(transparent)]
    Core(#[from] pkgsync_core::Error),

    /// Error from pkgsync-manifest
    #[error(transparent)]
    Manifest(#[from] pkgsync_manifest::Error),

    /// Error from pkgsync-fs
    #[error(transparent)]
    Fs(#[from] pkgsync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
