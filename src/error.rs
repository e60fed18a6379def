//! Error types for tnnlib.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tnnlib operations.
pub type Result<T> = std::result::Result<T, TnnError>;

/// Errors that can occur while loading the wrapper library or driving an
/// engine instance through it.
#[derive(Debug, Error)]
pub enum TnnError {
    /// The shared library failed to load.
    #[error("Failed to load native library `{name}`: {source}")]
    LibraryLoad {
        name: String,
        #[source]
        source: libloading::Error,
    },

    /// The library loaded but one of the entry points did not resolve.
    #[error("Native library is missing symbol `{symbol}`: {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// An entry point returned a non-zero status code.
    ///
    /// The code is carried verbatim; its meaning is defined by the library.
    #[error("Engine call `{call}` failed with status {status}")]
    EngineStatus { call: &'static str, status: i32 },

    /// An operation was attempted in the wrong lifecycle state.
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// Invalid image buffer.
    #[error("Invalid image: {0}")]
    Image(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

impl TnnError {
    /// Create a lifecycle error.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Create an image error.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TnnError::lifecycle("forward called before init");
        assert_eq!(
            format!("{}", err),
            "Lifecycle error: forward called before init"
        );

        let err = TnnError::EngineStatus {
            call: "init",
            status: 4096,
        };
        assert_eq!(
            format!("{}", err),
            "Engine call `init` failed with status 4096"
        );

        let err = TnnError::FileNotFound(PathBuf::from("/path/to/model.tnnmodel"));
        assert_eq!(format!("{}", err), "File not found: /path/to/model.tnnmodel");
    }
}
