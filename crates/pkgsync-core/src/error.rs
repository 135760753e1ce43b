//! Error types for pkgsync-core

/// Result type for pkgsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving packages
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No static method with this qualified name is registered
    #[error("static method not found: {method}")]
    InvocationNotFound { method: String },

    /// A static method ran and failed
    #[error("invoking {method} failed: {message}")]
    Invocation { method: String, message: String },

    /// The user rejected the resource import confirmation
    #[error("resource import declined")]
    UserDeclined,

    /// A package name that cannot be used as a directory name
    #[error("invalid package name '{name}': {reason}")]
    InvalidPackageName { name: String, reason: &'static str },

    /// Another operation holds the busy guard
    #[error("a resolution pass is already running")]
    Busy,

    /// Filesystem error from pkgsync-fs
    #[error(transparent)]
    Fs(#[from] pkgsync_fs::Error),

    /// Manifest error from pkgsync-manifest
    #[error(transparent)]
    Manifest(#[from] pkgsync_manifest::Error),
}
