//! Pronunciation requests and the profiles that shape them

use super::policy::{PolicyKind, VoicePolicy};
use super::voice::Voice;
use std::time::Duration;

/// Language every pronunciation request is spoken in
pub const REQUEST_LANGUAGE: &str = "en-US";

/// Speaking rate, pitch and volume as multipliers of the backend's normal value
///
/// 1.0 is the backend default for all three; volume 1.0 is full volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prosody {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for Prosody {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// A single thing to say, built per call and consumed by dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct PronunciationRequest {
    pub text: String,
    pub prosody: Prosody,
    pub language: &'static str,
    voice: Option<Voice>,
}

impl PronunciationRequest {
    pub fn new(text: impl Into<String>, prosody: Prosody) -> Self {
        Self {
            text: text.into(),
            prosody,
            language: REQUEST_LANGUAGE,
            voice: None,
        }
    }

    /// Attach a voice override
    ///
    /// Non-English voices are refused so the request never carries one.
    pub fn with_voice(mut self, voice: Option<Voice>) -> Self {
        self.set_voice(voice);
        self
    }

    pub fn set_voice(&mut self, voice: Option<Voice>) {
        self.voice = voice.filter(Voice::is_english);
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }
}

/// Everything that differs between the general and kid lesson pages
#[derive(Debug, Clone, PartialEq)]
pub struct PronunciationProfile {
    pub kind: PolicyKind,
    pub policy: VoicePolicy,
    pub prosody: Prosody,
    /// How long the pronunciation popup takes to close after its display window
    pub popup_exit: Option<Duration>,
}

impl PronunciationProfile {
    /// Slightly slow, normal pitch; popup closes with a short exit phase
    pub fn general() -> Self {
        Self {
            kind: PolicyKind::General,
            policy: VoicePolicy::general(),
            prosody: Prosody {
                rate: 0.8,
                pitch: 1.0,
                volume: 1.0,
            },
            popup_exit: Some(Duration::from_millis(300)),
        }
    }

    /// Much slower and higher pitched so kids can follow along
    pub fn kid() -> Self {
        Self {
            kind: PolicyKind::Kid,
            policy: VoicePolicy::kid(),
            prosody: Prosody {
                rate: 0.5,
                pitch: 1.4,
                volume: 1.0,
            },
            popup_exit: None,
        }
    }

    pub fn for_kind(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::General => Self::general(),
            PolicyKind::Kid => Self::kid(),
        }
    }

    /// Build a request for `text` with this profile's prosody
    pub fn request(&self, text: &str, voice: Option<Voice>) -> PronunciationRequest {
        PronunciationRequest::new(text, self.prosody).with_voice(voice)
    }
}
