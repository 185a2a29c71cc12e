//! Kids English Go Go Go
//!
//! A terminal lesson player for children learning English. Words and
//! sentences are pronounced through the platform's text-to-speech stack,
//! with a voice chosen by a configurable priority policy.

pub mod error;
pub mod input;
pub mod lesson;
pub mod platform;
pub mod scheduler;
pub mod speech;
pub mod state;
pub mod terminal;
pub mod ui;

pub use error::{LessonError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "kidsenglish";
