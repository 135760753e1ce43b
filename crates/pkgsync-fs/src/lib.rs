//! Filesystem primitives for pkgsync
//!
//! Provides slash-normalized project paths, atomic file replacement,
//! directory copy/move helpers, a sidecar file lock and format-agnostic
//! config loading.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
