//! Application state management
//!
//! The State struct is the central data structure for the lesson player,
//! holding configuration, the lesson and its pager, the pronunciation
//! pipeline, on-screen overlays and the timers that drive them.

pub mod config;

use crate::input::{ConfirmHandler, HandlerStack};
use crate::lesson::{Item, ItemKind, Lesson, Material, Pager};
use crate::scheduler::{Scheduler, Task};
use crate::speech::{create_synth, Pronouncer, PronunciationProfile, Synth};
use crate::ui::{render_screen, Frame, OverlayId, OverlayKind, Overlays, PageView};
use crate::Result;
use config::Config;
use log::{debug, info};
use std::time::{Duration, Instant};

/// Question asked before a new word is marked learned
pub const LEARNED_PROMPT: &str = "Did you learn this word? (y/n)";

/// Main application state for the lesson player
pub struct State {
    /// Configuration loaded from ~/.kidsenglish.cfg
    pub config: Config,

    /// The lesson being played; word statuses change as words are learned
    pub lesson: Lesson,

    /// Current page
    pub pager: Pager,

    /// Index of the selected item on the current page
    pub selected: usize,

    /// Voice selection and speech dispatch
    pub pronouncer: Pronouncer,

    /// Overlays drawn over the page
    pub overlays: Overlays,

    /// Modal key handlers (e.g. the learned-word confirmation)
    pub handlers: HandlerStack,

    /// Timers for polling, dispatch and overlay lifetimes
    scheduler: Scheduler,

    /// Set when the screen needs repainting
    dirty: bool,

    /// Cleared when the user quits
    running: bool,
}

impl State {
    /// Create the application state from configuration
    ///
    /// Loads the configured lesson (or the built-in one) and picks a speech
    /// backend; running without speech is allowed.
    pub fn new(config: Config) -> Result<Self> {
        let lesson = match config.lesson_file() {
            Some(path) => Lesson::load(&path)?,
            None => Lesson::builtin(),
        };
        info!("Lesson '{}' ({} pages)", lesson.title, lesson.pages.len());

        let synth = create_synth(config.backend());
        Ok(Self::with_parts(config, lesson, synth))
    }

    /// Assemble state from already-built parts
    pub fn with_parts(config: Config, lesson: Lesson, synth: Option<Box<dyn Synth>>) -> Self {
        let profile = PronunciationProfile::for_kind(config.profile());
        info!("Voice profile: {}", profile.kind);

        let pronouncer = Pronouncer::new(synth, profile)
            .with_timing(config.voice_poll_interval(), config.dispatch_delay());
        let pager = Pager::new(lesson.pages.len());

        Self {
            config,
            lesson,
            pager,
            selected: 0,
            pronouncer,
            overlays: Overlays::new(),
            handlers: HandlerStack::new(),
            scheduler: Scheduler::new(),
            dirty: true,
            running: true,
        }
    }

    /// Load the voice catalog for the first time
    pub fn start(&mut self, now: Instant) {
        self.pronouncer.refresh_catalog(now, &mut self.scheduler);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        info!("Quitting");
        self.running = false;
    }

    /// Was anything changed since the last call?
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Pending timers, for inspection
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // ========== Page content ==========

    /// Pronounceable items on the current page
    pub fn items(&self) -> Vec<Item> {
        self.lesson
            .pages
            .get(self.pager.index())
            .map(|p| p.items())
            .unwrap_or_default()
    }

    pub fn select_next(&mut self) {
        let count = self.items().len();
        if self.selected + 1 < count {
            self.selected += 1;
            self.dirty = true;
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.dirty = true;
        }
    }

    /// Move to the next page; the last page gets a celebration
    pub fn next_page(&mut self, now: Instant) {
        let turn = self.pager.next();
        if !turn.moved {
            return;
        }
        self.selected = 0;
        self.dirty = true;

        if turn.reached_last {
            self.scheduler
                .schedule(now, self.config.celebration_delay(), Task::ShowCelebration);
        }
    }

    pub fn previous_page(&mut self) {
        if self.pager.previous() {
            self.selected = 0;
            self.dirty = true;
        }
    }

    // ========== Pronunciation ==========

    /// Pronounce text and show the popup (plus an alert without speech)
    pub fn pronounce(&mut self, text: &str, now: Instant) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let ack = self.pronouncer.pronounce(text, now, &mut self.scheduler);

        // The new popup replaces the old one, so its timers go too
        let replaced: Vec<OverlayId> = self
            .overlays
            .iter()
            .filter(|o| matches!(o.kind, OverlayKind::Pronunciation(_)))
            .map(|o| o.id)
            .collect();
        self.scheduler.cancel_where(|task| match task {
            Task::CloseOverlay(id) | Task::RemoveOverlay(id) => replaced.contains(id),
            _ => false,
        });

        let popup = self.overlays.show(OverlayKind::Pronunciation(ack.text));
        let popup_task = match self.pronouncer.profile().popup_exit {
            Some(_) => Task::CloseOverlay(popup),
            None => Task::RemoveOverlay(popup),
        };
        self.scheduler.schedule(now, self.config.popup_duration(), popup_task);

        if let Some(alert) = ack.alert {
            self.show_alert(alert, now);
        }
        self.dirty = true;
    }

    /// Pronounce the item at `index` on the current page
    pub fn pronounce_item(&mut self, index: usize, now: Instant) -> bool {
        let Some(item) = self.items().into_iter().nth(index) else {
            return false;
        };
        self.selected = index;
        self.pronounce(&item.text, now);
        true
    }

    pub fn pronounce_selected(&mut self, now: Instant) -> bool {
        self.pronounce_item(self.selected, now)
    }

    /// Stop speaking and drop any request not yet spoken
    pub fn silence(&mut self) -> Result<()> {
        self.pronouncer.silence()
    }

    // ========== Word bank ==========

    /// Ask whether the selected word has been learned
    ///
    /// Only new words in the word bank prompt; returns whether a prompt opened.
    pub fn request_mark_learned(&mut self) -> bool {
        let page = self.pager.index();
        let word = match self.items().get(self.selected).map(|i| i.kind) {
            Some(ItemKind::Word(word)) => word,
            _ => return false,
        };
        let is_new = self
            .lesson
            .pages
            .get(page)
            .and_then(|p| p.words.get(word))
            .map(|t| t.is_new())
            .unwrap_or(false);
        if !is_new {
            return false;
        }

        let prompt = self
            .overlays
            .show(OverlayKind::Prompt(LEARNED_PROMPT.to_string()));
        self.handlers.push(Box::new(ConfirmHandler::new(Box::new(
            move |accepted: bool, state: &mut State, now: Instant| {
                state.answer_learned(prompt, page, word, accepted, now);
                Ok(())
            },
        ))));
        self.dirty = true;
        true
    }

    /// Apply the answer to a learned-word prompt
    pub fn answer_learned(
        &mut self,
        prompt: OverlayId,
        page: usize,
        word: usize,
        accepted: bool,
        now: Instant,
    ) {
        self.overlays.remove(prompt);
        self.dirty = true;
        if !accepted {
            debug!("Word not marked learned");
            return;
        }

        let learned = self
            .lesson
            .pages
            .get_mut(page)
            .and_then(|p| p.words.get_mut(word))
            .map(|t| t.mark_learned())
            .unwrap_or(false);
        if learned {
            self.show_for(OverlayKind::SuccessFlash, self.config.flash_duration(), now);
        }
    }

    /// Announce a printable material
    pub fn show_material(&mut self, material: Material, now: Instant) {
        info!("Printing {}...", material);
        self.show_alert(material.announcement().to_string(), now);
    }

    fn show_alert(&mut self, message: String, now: Instant) {
        self.show_for(OverlayKind::Alert(message), self.config.alert_duration(), now);
    }

    fn show_for(&mut self, kind: OverlayKind, duration: Duration, now: Instant) -> OverlayId {
        let id = self.overlays.show(kind);
        self.scheduler.schedule(now, duration, Task::RemoveOverlay(id));
        self.dirty = true;
        id
    }

    // ========== Event loop ==========

    /// Poll backend notifications and run every timer that is due
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        self.pronouncer.poll_voices_changed(now, &mut self.scheduler);
        self.pronouncer.drain_events();
        self.run_scheduled(now)
    }

    /// Run scheduled tasks that are due; returns whether any ran
    pub fn run_scheduled(&mut self, now: Instant) -> Result<bool> {
        let due = self.scheduler.take_due(now);
        let executed = !due.is_empty();

        for task in due {
            debug!("Running {:?}", task);
            match task {
                Task::RefreshCatalog => {
                    self.pronouncer.refresh_catalog(now, &mut self.scheduler);
                }
                Task::Dispatch { generation } => {
                    self.pronouncer.dispatch(generation);
                }
                Task::CloseOverlay(id) => {
                    let exit = self.pronouncer.profile().popup_exit.unwrap_or_default();
                    if self.overlays.close(id) {
                        self.scheduler.schedule(now, exit, Task::RemoveOverlay(id));
                        self.dirty = true;
                    }
                }
                Task::RemoveOverlay(id) => {
                    if self.overlays.remove(id) {
                        self.dirty = true;
                    }
                }
                Task::ShowCelebration => {
                    info!("🎉 Lesson completed! Great job!");
                    self.show_for(
                        OverlayKind::Celebration,
                        self.config.celebration_duration(),
                        now,
                    );
                }
            }
        }

        Ok(executed)
    }

    /// Time until the next scheduled task
    pub fn time_until_next_scheduled(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_next(now)
    }

    /// Render the current page and overlays
    pub fn frame(&self, width: u16) -> Frame {
        let items = self.items();
        let Some(page) = self.lesson.pages.get(self.pager.index()) else {
            return Frame::default();
        };
        let view = PageView {
            lesson_title: &self.lesson.title,
            page,
            number: self.pager.number(),
            total: self.pager.total(),
            items: &items,
            selected: self.selected,
        };
        render_screen(&view, &self.overlays, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::WordStatus;
    use crate::ui::Phase;

    fn state() -> State {
        State::with_parts(Config::defaults(), Lesson::builtin(), None)
    }

    #[test]
    fn test_celebration_after_last_page() {
        let start = Instant::now();
        let mut state = state();
        state.next_page(start);
        state.next_page(start);
        assert!(!state.scheduler().contains(&Task::ShowCelebration));

        state.next_page(start);
        assert!(state.pager.is_last());
        assert!(state.scheduler().contains(&Task::ShowCelebration));

        state.run_scheduled(start + Duration::from_millis(500)).unwrap();
        assert!(state
            .overlays
            .iter()
            .any(|o| o.kind == OverlayKind::Celebration));

        state.run_scheduled(start + Duration::from_millis(3500)).unwrap();
        assert!(state.overlays.is_empty());
    }

    #[test]
    fn test_general_popup_closes_then_disappears() {
        let start = Instant::now();
        let mut state = state();
        assert_eq!(state.pronouncer.profile().kind, crate::speech::PolicyKind::General);

        state.pronounce("  cat  ", start);
        let popup = state.overlays.iter().next().map(|o| (o.id, o.kind.clone())).unwrap();
        assert_eq!(popup.1, OverlayKind::Pronunciation("cat".into()));

        state.run_scheduled(start + Duration::from_millis(2000)).unwrap();
        assert_eq!(state.overlays.get(popup.0).map(|o| o.phase), Some(Phase::Closing));

        state.run_scheduled(start + Duration::from_millis(2300)).unwrap();
        assert!(state.overlays.get(popup.0).is_none());
    }

    #[test]
    fn test_new_popup_replaces_old_and_its_timers() {
        let start = Instant::now();
        let mut state = state();
        state.pronounce("cat", start);
        state.pronounce("dog", start + Duration::from_millis(1500));

        let popups: Vec<_> = state
            .overlays
            .iter()
            .filter(|o| matches!(o.kind, OverlayKind::Pronunciation(_)))
            .map(|o| (o.id, o.kind.clone()))
            .collect();
        assert_eq!(popups.len(), 1);
        assert_eq!(popups[0].1, OverlayKind::Pronunciation("dog".into()));

        // The first popup's close time passes without touching the second
        state.run_scheduled(start + Duration::from_millis(2000)).unwrap();
        assert_eq!(state.overlays.get(popups[0].0).map(|o| o.phase), Some(Phase::Visible));

        state.run_scheduled(start + Duration::from_millis(3500)).unwrap();
        assert_eq!(state.overlays.get(popups[0].0).map(|o| o.phase), Some(Phase::Closing));
    }

    #[test]
    fn test_kid_popup_has_no_exit_phase() {
        let start = Instant::now();
        let mut config = Config::defaults();
        config.set("speech", "profile", "kid");
        let mut state = State::with_parts(config, Lesson::builtin(), None);

        state.pronounce("dog", start);
        let popup = state
            .overlays
            .iter()
            .find(|o| matches!(o.kind, OverlayKind::Pronunciation(_)))
            .map(|o| o.id)
            .unwrap();

        state.run_scheduled(start + Duration::from_millis(2000)).unwrap();
        assert!(state.overlays.get(popup).is_none());
    }

    #[test]
    fn test_without_speech_shows_alert() {
        let start = Instant::now();
        let mut state = state();
        state.pronounce("cat", start);
        assert!(state
            .overlays
            .iter()
            .any(|o| o.kind == OverlayKind::Alert("🔊 Say: \"cat\"".into())));
        assert!(state.frame(80).contains("cat"));
    }

    #[test]
    fn test_mark_learned_with_confirmation() {
        let start = Instant::now();
        let mut state = state();
        assert!(state.request_mark_learned());
        assert_eq!(state.handlers.len(), 1);
        assert!(state.frame(80).contains("Did you learn this word?"));

        let prompt = state
            .overlays
            .iter()
            .find(|o| matches!(o.kind, OverlayKind::Prompt(_)))
            .map(|o| o.id)
            .unwrap();
        state.answer_learned(prompt, 0, 0, true, start);
        assert_eq!(state.lesson.pages[0].words[0].status, WordStatus::Known);
        assert!(state
            .overlays
            .iter()
            .any(|o| o.kind == OverlayKind::SuccessFlash));

        // Known words don't prompt again
        state.handlers.pop();
        assert!(!state.request_mark_learned());
    }

    #[test]
    fn test_selection_bounds() {
        let mut state = state();
        state.select_previous();
        assert_eq!(state.selected, 0);

        let count = state.items().len();
        for _ in 0..count + 3 {
            state.select_next();
        }
        assert_eq!(state.selected, count - 1);

        state.next_page(Instant::now());
        assert_eq!(state.selected, 0);
        assert!(!state.pronounce_item(99, Instant::now()));
    }
}
