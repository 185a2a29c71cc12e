//! Speech synthesizer abstraction
//!
//! The lesson player talks to the platform's speech stack only through the
//! `Synth` trait, so the pronunciation pipeline can be driven by a fake in
//! tests and degrades to visual-only feedback when no backend exists.

use super::request::PronunciationRequest;
use super::voice::Voice;
use crate::platform::is_wsl;
use crate::Result;
use log::info;
use std::fmt;
use std::str::FromStr;

/// Lifecycle notifications for a spoken utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceEvent {
    Started,
    Ended,
    Failed(String),
}

/// Host speech capability
pub trait Synth: Send {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Voices the backend currently offers (may be empty while loading)
    fn voices(&mut self) -> Result<Vec<Voice>>;

    /// Silence whatever is being spoken
    fn cancel(&mut self) -> Result<()>;

    /// Speak a request, using its voice override if it has one
    fn speak(&mut self, request: &PronunciationRequest) -> Result<()>;

    /// Has the voice list changed since the last call?
    ///
    /// Backends without change notification never report one; polling on an
    /// empty catalog covers them.
    fn voices_changed(&mut self) -> bool {
        false
    }

    /// Does the backend report when an utterance ends or fails?
    ///
    /// Callers waiting for speech to finish give up at once when it doesn't.
    fn reports_utterance_end(&self) -> bool {
        false
    }

    /// Take the utterance events reported since the last call
    fn drain_events(&mut self) -> Vec<UtteranceEvent> {
        Vec::new()
    }
}

/// Which speech backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChoice {
    /// Detect the best available backend
    Auto,
    /// tts crate (Speech Dispatcher, AVFoundation, WinRT)
    Native,
    /// espeak-ng subprocess
    Espeak,
    /// No speech; visual feedback only
    None,
}

impl FromStr for BackendChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(BackendChoice::Auto),
            "native" | "tts" => Ok(BackendChoice::Native),
            "espeak" | "espeak-ng" => Ok(BackendChoice::Espeak),
            "none" | "off" => Ok(BackendChoice::None),
            other => Err(format!("unknown speech backend '{}'", other)),
        }
    }
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendChoice::Auto => "auto",
            BackendChoice::Native => "native",
            BackendChoice::Espeak => "espeak",
            BackendChoice::None => "none",
        };
        f.write_str(name)
    }
}

/// Create a speech synthesizer, or `None` when speech is unavailable
///
/// With `Auto` the backend order depends on the environment:
///
/// **WSL:** espeak-ng first (speech-dispatcher is rarely set up), then the
/// native backend.
///
/// **Everywhere else:** the native backend first, then espeak-ng.
///
/// Every failure is logged; running without speech is a supported mode.
pub fn create_synth(choice: BackendChoice) -> Option<Box<dyn Synth>> {
    use super::backends::espeak::EspeakSynth;
    use super::backends::native::NativeSynth;

    let order: &[BackendChoice] = match choice {
        BackendChoice::None => {
            info!("Speech disabled by configuration");
            return None;
        }
        BackendChoice::Native => &[BackendChoice::Native],
        BackendChoice::Espeak => &[BackendChoice::Espeak],
        BackendChoice::Auto if is_wsl() => {
            info!("Detected WSL environment");
            &[BackendChoice::Espeak, BackendChoice::Native]
        }
        BackendChoice::Auto => &[BackendChoice::Native, BackendChoice::Espeak],
    };

    for backend in order {
        info!("Trying {} speech backend...", backend);
        let created: Result<Box<dyn Synth>> = match backend {
            BackendChoice::Native => NativeSynth::new().map(|s| Box::new(s) as Box<dyn Synth>),
            BackendChoice::Espeak => EspeakSynth::new().map(|s| Box::new(s) as Box<dyn Synth>),
            _ => continue,
        };

        match created {
            Ok(synth) => {
                info!("✓ Successfully initialized {} backend", synth.name());
                return Some(synth);
            }
            Err(e) => {
                info!("✗ {} backend unavailable: {}", backend, e);
            }
        }
    }

    info!("No speech backend available; pronunciation will be visual only");
    None
}
