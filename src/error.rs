//! Error types for the lesson player

use std::io;
use thiserror::Error;

/// Main error type for the lesson player
#[derive(Error, Debug)]
pub enum LessonError {
    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Lesson error: {0}")]
    Lesson(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for lesson player operations
pub type Result<T> = std::result::Result<T, LessonError>;

impl From<String> for LessonError {
    fn from(s: String) -> Self {
        LessonError::Other(s)
    }
}

impl From<&str> for LessonError {
    fn from(s: &str) -> Self {
        LessonError::Other(s.to_string())
    }
}
