//! Error types for Deskhand.

use thiserror::Error;

/// Library-level error type for Deskhand operations.
///
/// Tool failures never show up here: tools report them as text so the
/// agent can react. These variants cover configuration, the runner and
/// the plumbing around it.
#[derive(Error, Debug)]
pub enum DeskhandError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Runner error: {0}")]
    Runner(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Deskhand operations.
pub type Result<T> = std::result::Result<T, DeskhandError>;
