use std::path::PathBuf;

/// Errors that can occur while reading, interpreting or writing manifests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Manifest missing, unreadable or not well-formed JSON.
    #[error("failed to parse manifest at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Failure writing a manifest.
    #[error(transparent)]
    Io(#[from] pkgsync_fs::Error),

    /// Failed to serialize a manifest document.
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A key holds a value of the wrong type.
    #[error("manifest key '{key}' should be {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A required key is absent.
    #[error("manifest entry is missing required key '{key}'")]
    MissingField { key: String },

    /// An entry that cannot be classified.
    #[error("malformed manifest entry: {reason}")]
    MalformedEntry { reason: String },
}

impl Error {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
