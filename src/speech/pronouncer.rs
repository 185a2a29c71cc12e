//! Pronunciation pipeline
//!
//! The `Pronouncer` owns the speech backend (if there is one), the voice
//! catalog and the voice currently chosen from it. Pronouncing a word always
//! produces a visual acknowledgment; with a backend it also silences any
//! earlier utterance and schedules the new one a moment later, so a catalog
//! refresh arriving in between is still honoured.

use super::request::{PronunciationProfile, PronunciationRequest};
use super::synth::{Synth, UtteranceEvent};
use super::voice::{Voice, VoiceCatalog};
use crate::scheduler::{Scheduler, Task};
use crate::Result;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Default interval between catalog polls while no voices are listed
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default delay between a pronounce call and the speech it triggers
pub const DEFAULT_DISPATCH_DELAY: Duration = Duration::from_millis(100);

/// Sleep between checks while waiting for an utterance
const WAIT_STEP: Duration = Duration::from_millis(20);

/// Caption shown under every pronunciation popup
pub const POPUP_CAPTION: &str = "Listen and repeat!";

/// How waiting for a single utterance ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The backend reported the end (or failure) of the utterance
    Finished,
    /// Nothing was spoken: no request, superseded, or the backend refused it
    NotSpoken,
    /// Spoken, but the backend never reports when speech ends
    Unreported,
    /// Gave up waiting
    TimedOut,
}

/// Visual feedback for a pronounce call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgment {
    /// The text that was pronounced
    pub text: String,

    /// Blocking alert shown when there is no speech capability
    pub alert: Option<String>,
}

impl Acknowledgment {
    /// First line of the pronunciation popup
    pub fn headline(&self) -> String {
        format!("🔊 \"{}\"", self.text)
    }
}

/// Voice selection plus request dispatch over an optional backend
pub struct Pronouncer {
    synth: Option<Box<dyn Synth>>,
    profile: PronunciationProfile,
    catalog: VoiceCatalog,
    selected: Option<Voice>,
    poll_interval: Duration,
    dispatch_delay: Duration,

    /// Bumped by every pronounce call; only the latest request is spoken
    generation: u64,
    pending: Option<PronunciationRequest>,

    /// Text of the last dispatched request, for event logging
    speaking: Option<String>,
}

impl Pronouncer {
    pub fn new(synth: Option<Box<dyn Synth>>, profile: PronunciationProfile) -> Self {
        Self {
            synth,
            profile,
            catalog: VoiceCatalog::new(),
            selected: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            dispatch_delay: DEFAULT_DISPATCH_DELAY,
            generation: 0,
            pending: None,
            speaking: None,
        }
    }

    /// Override the catalog poll interval and dispatch delay
    pub fn with_timing(mut self, poll_interval: Duration, dispatch_delay: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.dispatch_delay = dispatch_delay;
        self
    }

    /// Is a speech backend available?
    pub fn has_speech(&self) -> bool {
        self.synth.is_some()
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.synth.as_deref().map(|s| s.name())
    }

    pub fn profile(&self) -> &PronunciationProfile {
        &self.profile
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    /// Voice the profile's policy picked from the current catalog
    pub fn selected_voice(&self) -> Option<&Voice> {
        self.selected.as_ref()
    }

    /// Re-read the catalog and re-run voice selection
    ///
    /// While the backend still reports no voices another refresh is
    /// scheduled after the poll interval.
    pub fn refresh_catalog(&mut self, now: Instant, scheduler: &mut Scheduler) {
        let Some(synth) = self.synth.as_mut() else {
            return;
        };

        let voices = match synth.voices() {
            Ok(voices) => voices,
            Err(e) => {
                warn!("Failed to list voices: {}", e);
                Vec::new()
            }
        };
        self.catalog.replace(voices);
        info!("Loaded voices: {:?}", self.catalog.names());

        self.select();

        if self.catalog.is_empty() && !scheduler.contains(&Task::RefreshCatalog) {
            debug!("No voices yet, polling again in {:?}", self.poll_interval);
            scheduler.schedule(now, self.poll_interval, Task::RefreshCatalog);
        }
    }

    /// The backend reported a change in its voice list
    pub fn on_voices_changed(&mut self, now: Instant, scheduler: &mut Scheduler) {
        debug!("Voices changed");
        self.refresh_catalog(now, scheduler);
    }

    /// Ask the backend whether its voices changed and refresh if so
    pub fn poll_voices_changed(&mut self, now: Instant, scheduler: &mut Scheduler) {
        let changed = self
            .synth
            .as_mut()
            .map(|s| s.voices_changed())
            .unwrap_or(false);
        if changed {
            self.on_voices_changed(now, scheduler);
        }
    }

    fn select(&mut self) {
        self.selected = self
            .profile
            .policy
            .select_voice(self.catalog.voices())
            .cloned();

        match &self.selected {
            Some(voice) => info!("Using {} voice: {}", self.profile.kind, voice),
            None => debug!("No English voice listed; backend default applies"),
        }
    }

    /// Pronounce `text`
    ///
    /// Without a backend this only returns an acknowledgment carrying an
    /// alert; it is a supported mode, not an error.
    pub fn pronounce(
        &mut self,
        text: &str,
        now: Instant,
        scheduler: &mut Scheduler,
    ) -> Acknowledgment {
        info!("🔊 Pronouncing: {}", text);

        let Some(synth) = self.synth.as_mut() else {
            info!("Speech synthesis not supported, showing visual guide only");
            return Acknowledgment {
                text: text.to_string(),
                alert: Some(format!("🔊 Say: \"{}\"", text)),
            };
        };

        if let Err(e) = synth.cancel() {
            warn!("Failed to cancel previous speech: {}", e);
        }

        self.generation += 1;
        self.pending = Some(self.profile.request(text, self.selected.clone()));
        scheduler.schedule(
            now,
            self.dispatch_delay,
            Task::Dispatch {
                generation: self.generation,
            },
        );

        Acknowledgment {
            text: text.to_string(),
            alert: None,
        }
    }

    /// Speak the pending request scheduled under `generation`
    ///
    /// A request superseded by a later pronounce call is dropped. Backend
    /// failures are logged and never retried. Returns whether the backend
    /// accepted the request.
    pub fn dispatch(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping superseded request (generation {}, latest {})",
                generation, self.generation
            );
            return false;
        }

        let (Some(synth), Some(mut request)) = (self.synth.as_mut(), self.pending.take()) else {
            return false;
        };

        request.set_voice(self.selected.clone());
        if let Some(voice) = request.voice() {
            info!("Using voice: {}", voice.name);
        }

        match synth.speak(&request) {
            Ok(()) => {
                self.speaking = Some(request.text);
                true
            }
            Err(e) => {
                warn!("Speech error: {}", e);
                false
            }
        }
    }

    /// Will the backend tell us when an utterance has finished?
    pub fn reports_utterance_end(&self) -> bool {
        self.synth
            .as_deref()
            .map(|s| s.reports_utterance_end())
            .unwrap_or(false)
    }

    /// Run pending dispatches until the latest utterance has finished
    ///
    /// Used outside the event loop, where nothing else drives the scheduler.
    /// Returns as soon as it is clear no end-of-speech event will come.
    pub fn wait_until_spoken(
        &mut self,
        scheduler: &mut Scheduler,
        timeout: Duration,
    ) -> WaitOutcome {
        let start = Instant::now();
        let mut dispatched = false;

        while start.elapsed() < timeout {
            for task in scheduler.take_due(Instant::now()) {
                if let Task::Dispatch { generation } = task {
                    let spoke = self.dispatch(generation);
                    if generation == self.generation {
                        if !spoke {
                            return WaitOutcome::NotSpoken;
                        }
                        dispatched = true;
                    }
                }
            }

            if dispatched && !self.reports_utterance_end() {
                return WaitOutcome::Unreported;
            }

            let ended = self
                .drain_events()
                .iter()
                .any(|e| matches!(e, UtteranceEvent::Ended | UtteranceEvent::Failed(_)));
            if dispatched && ended {
                return WaitOutcome::Finished;
            }
            if !dispatched && !scheduler.contains_where(|t| matches!(t, Task::Dispatch { .. })) {
                return WaitOutcome::NotSpoken;
            }

            std::thread::sleep(WAIT_STEP);
        }

        WaitOutcome::TimedOut
    }

    /// Silence any current speech and drop a request not yet dispatched
    pub fn silence(&mut self) -> Result<()> {
        self.pending = None;
        self.generation += 1;
        match self.synth.as_mut() {
            Some(synth) => synth.cancel(),
            None => Ok(()),
        }
    }

    /// Log utterance events reported by the backend and return them
    pub fn drain_events(&mut self) -> Vec<UtteranceEvent> {
        let events = match self.synth.as_mut() {
            Some(synth) => synth.drain_events(),
            None => return Vec::new(),
        };

        let text = self.speaking.as_deref().unwrap_or("");
        for event in &events {
            match event {
                UtteranceEvent::Started => info!("Speech started: {}", text),
                UtteranceEvent::Ended => debug!("Speech ended"),
                UtteranceEvent::Failed(reason) => warn!("Speech error: {}", reason),
            }
        }
        events
    }
}
