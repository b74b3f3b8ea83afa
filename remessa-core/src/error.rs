//! Error types for remittance generation
//!
//! The encoder itself never fails; these errors come from the surfaces
//! around it (configuration, row ingestion, state files, inspection).

use thiserror::Error;

/// Result type for remittance operations
pub type Result<T> = std::result::Result<T, Error>;

/// Remittance errors
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Record layout table is malformed
    #[error("Layout error in {layout}: {reason}")]
    Layout {
        /// Layout name
        layout: &'static str,
        /// Reason
        reason: String,
    },

    /// Input sheet is missing required columns
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Sequence state file error
    #[error("State file error: {0}")]
    State(String),

    /// Emitted file could not be inspected
    #[error("Inspection error: {0}")]
    Inspection(String),

    /// TOML decoding error
    #[error("TOML parse error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    /// TOML encoding error
    #[error("TOML write error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
