//! Native Rust TTS backend using the tts crate
//!
//! The `tts` crate provides a unified interface to:
//! - Speech Dispatcher on Linux (via native bindings)
//! - AVFoundation on macOS/iOS (via native bindings)
//! - WinRT on Windows

use crate::speech::{PronunciationRequest, Synth, UtteranceEvent, Voice};
use crate::{LessonError, Result};
use log::{debug, error, warn};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tts::Tts as TtsCrate;

/// How often the voice list is re-read to detect changes
const CHANGE_CHECK_INTERVAL: Duration = Duration::from_secs(2);

type EventQueue = Arc<Mutex<Vec<UtteranceEvent>>>;

/// Native TTS backend using the tts crate
pub struct NativeSynth {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    /// Voices as the tts crate reported them on the last listing
    listed: Vec<tts::Voice>,

    /// Ids from the last change check
    known_ids: Vec<String>,

    /// When the voice list was last compared
    last_change_check: Instant,

    /// Events pushed by the tts crate's utterance callbacks
    events: EventQueue,

    /// Whether the platform delivers utterance callbacks at all
    callbacks: bool,

    /// Without callbacks, the end of speech is found by polling `is_speaking`
    poll_speaking: bool,

    /// An utterance was started and its end not yet reported by polling
    awaiting_end: bool,
}

impl NativeSynth {
    /// Create a new native TTS synthesizer
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS backend");

        let tts = TtsCrate::default()
            .map_err(|e| LessonError::Speech(format!("Failed to initialize TTS: {}", e)))?;

        let events: EventQueue = Arc::new(Mutex::new(Vec::new()));
        let callbacks = Self::install_callbacks(&tts, &events);
        let poll_speaking = !callbacks && tts.supported_features().is_speaking;

        debug!("Native TTS backend created successfully");

        Ok(Self {
            tts,
            listed: Vec::new(),
            known_ids: Vec::new(),
            last_change_check: Instant::now(),
            events,
            callbacks,
            poll_speaking,
            awaiting_end: false,
        })
    }

    /// Route utterance begin/end/stop callbacks into the event queue
    ///
    /// Returns false when the platform has no utterance callbacks.
    fn install_callbacks(tts: &TtsCrate, events: &EventQueue) -> bool {
        if !tts.supported_features().utterance_callbacks {
            debug!("Utterance callbacks not supported on this platform");
            return false;
        }

        let queue = Arc::clone(events);
        let begin = tts.on_utterance_begin(Some(Box::new(move |_id| {
            push_event(&queue, UtteranceEvent::Started);
        })));

        let queue = Arc::clone(events);
        let end = tts.on_utterance_end(Some(Box::new(move |_id| {
            push_event(&queue, UtteranceEvent::Ended);
        })));

        let queue = Arc::clone(events);
        let stop = tts.on_utterance_stop(Some(Box::new(move |_id| {
            push_event(&queue, UtteranceEvent::Ended);
        })));

        let mut installed = true;
        for result in [begin, end, stop] {
            if let Err(e) = result {
                warn!("Failed to register utterance callback: {}", e);
                installed = false;
            }
        }
        installed
    }

    /// Map a multiplier onto the backend's range around its normal value
    ///
    /// 1.0 is `normal`; 0.0 reaches `min` and 2.0 reaches `max`. Backends
    /// whose normal is 0 (Speech Dispatcher uses -100..100) still move.
    fn scale(multiplier: f32, normal: f32, min: f32, max: f32) -> f32 {
        let value = if multiplier < 1.0 {
            normal - (1.0 - multiplier) * (normal - min)
        } else {
            normal + (multiplier - 1.0) * (max - normal)
        };
        value.clamp(min, max)
    }

    fn apply_prosody(&mut self, request: &PronunciationRequest) -> Result<()> {
        let features = self.tts.supported_features();
        let prosody = request.prosody;

        if features.rate {
            let rate = Self::scale(
                prosody.rate,
                self.tts.normal_rate(),
                self.tts.min_rate(),
                self.tts.max_rate(),
            );
            self.tts
                .set_rate(rate)
                .map_err(|e| LessonError::Speech(format!("Failed to set rate: {}", e)))?;
        } else {
            warn!("Rate control not supported on this platform");
        }

        if features.pitch {
            let pitch = Self::scale(
                prosody.pitch,
                self.tts.normal_pitch(),
                self.tts.min_pitch(),
                self.tts.max_pitch(),
            );
            self.tts
                .set_pitch(pitch)
                .map_err(|e| LessonError::Speech(format!("Failed to set pitch: {}", e)))?;
        }

        if features.volume {
            // Volume is relative to full, not to the engine's normal
            let min = self.tts.min_volume();
            let max = self.tts.max_volume();
            let volume = (min + prosody.volume * (max - min)).clamp(min, max);
            self.tts
                .set_volume(volume)
                .map_err(|e| LessonError::Speech(format!("Failed to set volume: {}", e)))?;
        }

        Ok(())
    }

    fn apply_voice(&mut self, voice: &Voice) -> Result<()> {
        if !self.tts.supported_features().voice {
            debug!("Voice selection not supported on this platform");
            return Ok(());
        }

        if self.listed.iter().all(|v| v.id() != voice.id) {
            self.voices()?;
        }

        match self.listed.iter().find(|v| v.id() == voice.id) {
            Some(native) => {
                debug!("Selecting voice: {}", voice);
                self.tts
                    .set_voice(native)
                    .map_err(|e| LessonError::Speech(format!("Failed to set voice: {}", e)))
            }
            None => {
                warn!("Voice {} is no longer offered by the platform", voice);
                Ok(())
            }
        }
    }
}

/// Store the latest voice ids; returns whether they differ from the known ones
fn record_ids(known: &mut Vec<String>, ids: Vec<String>) -> bool {
    if *known == ids {
        return false;
    }
    *known = ids;
    true
}

fn push_event(queue: &EventQueue, event: UtteranceEvent) {
    if let Ok(mut events) = queue.lock() {
        events.push(event);
    }
}

impl Synth for NativeSynth {
    fn name(&self) -> &str {
        "native"
    }

    fn voices(&mut self) -> Result<Vec<Voice>> {
        self.listed = self
            .tts
            .voices()
            .map_err(|e| LessonError::Speech(format!("Failed to get voices: {}", e)))?;

        // The catalog now matches this listing; only later changes count
        record_ids(&mut self.known_ids, self.listed.iter().map(|v| v.id()).collect());

        Ok(self
            .listed
            .iter()
            .map(|v| Voice::with_id(v.id(), v.name(), v.language().as_str()))
            .collect())
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.tts.stop().map_err(|e| {
            error!("Failed to cancel speech: {}", e);
            LessonError::Speech(format!("Cancel failed: {}", e))
        })?;

        Ok(())
    }

    fn speak(&mut self, request: &PronunciationRequest) -> Result<()> {
        if request.text.is_empty() {
            push_event(&self.events, UtteranceEvent::Ended);
            return Ok(());
        }

        self.apply_prosody(request)?;
        if let Some(voice) = request.voice() {
            self.apply_voice(voice)?;
        }

        debug!("Speaking: {}", request.text);
        self.tts.speak(request.text.as_str(), true).map_err(|e| {
            error!("Failed to speak: {}", e);
            LessonError::Speech(format!("Speak failed: {}", e))
        })?;
        self.awaiting_end = self.poll_speaking;

        Ok(())
    }

    fn voices_changed(&mut self) -> bool {
        if self.last_change_check.elapsed() < CHANGE_CHECK_INTERVAL {
            return false;
        }
        self.last_change_check = Instant::now();

        let ids: Vec<String> = match self.tts.voices() {
            Ok(voices) => voices.iter().map(|v| v.id()).collect(),
            Err(e) => {
                debug!("Voice change check failed: {}", e);
                return false;
            }
        };

        record_ids(&mut self.known_ids, ids)
    }

    fn reports_utterance_end(&self) -> bool {
        self.callbacks || self.poll_speaking
    }

    fn drain_events(&mut self) -> Vec<UtteranceEvent> {
        let mut drained = match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(_) => Vec::new(),
        };

        if self.awaiting_end {
            match self.tts.is_speaking() {
                Ok(true) => {}
                Ok(false) => {
                    self.awaiting_end = false;
                    drained.push(UtteranceEvent::Ended);
                }
                Err(e) => {
                    self.awaiting_end = false;
                    drained.push(UtteranceEvent::Failed(e.to_string()));
                }
            }
        }
        drained
    }
}
