//! Input system tests
//!
//! Tests the key bindings and the modal handler stack against a lesson state

use kidsenglish::input::{
    create_default_keymap, handle_input, handle_keys, DefaultKeyHandler, HandlerAction, KeyAction,
    KeyHandler,
};
use kidsenglish::lesson::{Lesson, Material, WordStatus};
use kidsenglish::speech::{PronunciationRequest, Synth, Voice};
use kidsenglish::state::config::Config;
use kidsenglish::state::State;
use kidsenglish::ui::OverlayKind;
use kidsenglish::Result;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Synth that only remembers what it was asked to say
struct SpokenLog(Arc<Mutex<Vec<String>>>);

impl Synth for SpokenLog {
    fn name(&self) -> &str {
        "log"
    }

    fn voices(&mut self) -> Result<Vec<Voice>> {
        Ok(vec![Voice::new("Google US English", "en-US")])
    }

    fn cancel(&mut self) -> Result<()> {
        Ok(())
    }

    fn speak(&mut self, request: &PronunciationRequest) -> Result<()> {
        self.0.lock().unwrap().push(request.text.clone());
        Ok(())
    }
}

fn speaking_state() -> (State, Arc<Mutex<Vec<String>>>) {
    let spoken = Arc::new(Mutex::new(Vec::new()));
    let synth: Box<dyn Synth> = Box::new(SpokenLog(spoken.clone()));
    let mut state = State::with_parts(Config::defaults(), Lesson::builtin(), Some(synth));
    state.start(Instant::now());
    (state, spoken)
}

fn press(
    state: &mut State,
    handler: &mut DefaultKeyHandler,
    key: &[u8],
    now: Instant,
) -> HandlerAction {
    handle_input(key, state, handler, now).unwrap()
}

/// Swallows one key, then removes itself
struct OneShot;

impl KeyHandler for OneShot {
    fn process(&mut self, _key: &[u8], _state: &mut State, _now: Instant) -> Result<HandlerAction> {
        Ok(HandlerAction::Remove)
    }
}

#[test]
fn test_keymap_creation() {
    let keymap = create_default_keymap();

    // Page navigation
    assert_eq!(keymap.get(&b"\x1b[C".to_vec()), Some(&KeyAction::NextPage));
    assert_eq!(keymap.get(&b" ".to_vec()), Some(&KeyAction::NextPage));
    assert_eq!(keymap.get(&b"\x1b[D".to_vec()), Some(&KeyAction::PreviousPage));

    // Selection and pronunciation
    assert_eq!(keymap.get(&b"\x1b[A".to_vec()), Some(&KeyAction::SelectPrevious));
    assert_eq!(keymap.get(&b"\x1b[B".to_vec()), Some(&KeyAction::SelectNext));
    assert_eq!(keymap.get(&b"\r".to_vec()), Some(&KeyAction::SaySelected));
    assert_eq!(keymap.get(&b"1".to_vec()), Some(&KeyAction::SayItem(0)));
    assert_eq!(keymap.get(&b"9".to_vec()), Some(&KeyAction::SayItem(8)));
    assert_eq!(keymap.get(&b"0".to_vec()), None);

    // Materials and misc
    assert_eq!(
        keymap.get(&b"F".to_vec()),
        Some(&KeyAction::Print(Material::Flashcards))
    );
    assert_eq!(keymap.get(&b"l".to_vec()), Some(&KeyAction::MarkLearned));
    assert_eq!(keymap.get(&b"x".to_vec()), Some(&KeyAction::Silence));
    assert_eq!(keymap.get(&b"q".to_vec()), Some(&KeyAction::Quit));
    assert_eq!(keymap.get(&b"\x03".to_vec()), Some(&KeyAction::Quit));
}

#[test]
fn test_digit_pronounces_item() {
    let start = Instant::now();
    let (mut state, spoken) = speaking_state();
    let mut handler = DefaultKeyHandler::new(create_default_keymap());

    assert_eq!(press(&mut state, &mut handler, b"2", start), HandlerAction::Handled);
    assert_eq!(state.selected, 1);
    assert!(state.frame(80).contains("goodbye"));
    assert!(spoken.lock().unwrap().is_empty());

    state.tick(start + Duration::from_millis(100)).unwrap();
    assert_eq!(*spoken.lock().unwrap(), vec!["goodbye".to_string()]);
}

#[test]
fn test_navigation_keys() {
    let start = Instant::now();
    let (mut state, spoken) = speaking_state();
    let mut handler = DefaultKeyHandler::new(create_default_keymap());

    press(&mut state, &mut handler, b"\x1b[C", start);
    assert_eq!(state.pager.number(), 2);
    press(&mut state, &mut handler, b"\x1b[B", start);
    press(&mut state, &mut handler, b"\r", start);
    press(&mut state, &mut handler, b"\x1b[D", start);
    assert_eq!(state.pager.number(), 1);
    assert_eq!(state.selected, 0);

    state.tick(start + Duration::from_millis(100)).unwrap();
    assert_eq!(*spoken.lock().unwrap(), vec!["dog".to_string()]);
}

#[test]
fn test_unbound_key_passes_through() {
    let (mut state, _) = speaking_state();
    let mut handler = DefaultKeyHandler::new(create_default_keymap());
    assert_eq!(
        press(&mut state, &mut handler, b"z", Instant::now()),
        HandlerAction::Passthrough
    );
}

#[test]
fn test_modal_handler_swallows_key() {
    let (mut state, _) = speaking_state();
    let mut handler = DefaultKeyHandler::new(create_default_keymap());
    state.handlers.push(Box::new(OneShot));

    assert_eq!(press(&mut state, &mut handler, b"q", Instant::now()), HandlerAction::Remove);
    assert!(state.is_running());
    assert!(state.handlers.is_empty());

    press(&mut state, &mut handler, b"q", Instant::now());
    assert!(!state.is_running());
}

#[test]
fn test_mark_learned_confirmation() {
    let start = Instant::now();
    let (mut state, _) = speaking_state();
    let mut handler = DefaultKeyHandler::new(create_default_keymap());

    // Declining leaves the word new
    press(&mut state, &mut handler, b"l", start);
    assert_eq!(state.handlers.len(), 1);
    press(&mut state, &mut handler, b"n", start);
    assert!(state.handlers.is_empty());
    assert_eq!(state.lesson.pages[0].words[0].status, WordStatus::New);

    press(&mut state, &mut handler, b"l", start);
    press(&mut state, &mut handler, b"y", start);
    assert_eq!(state.lesson.pages[0].words[0].status, WordStatus::Known);
    assert!(state
        .overlays
        .iter()
        .any(|o| o.kind == OverlayKind::SuccessFlash));

    state.tick(start + Duration::from_millis(500)).unwrap();
    assert!(state.overlays.is_empty());
}

#[test]
fn test_print_announces_material() {
    let start = Instant::now();
    let (mut state, _) = speaking_state();
    let mut handler = DefaultKeyHandler::new(create_default_keymap());

    press(&mut state, &mut handler, b"C", start);
    let announcement = Material::ColoringPages.announcement().to_string();
    assert!(state
        .overlays
        .iter()
        .any(|o| o.kind == OverlayKind::Alert(announcement.clone())));
}

#[test]
fn test_repeated_arrows_in_one_read() {
    let (mut state, _) = speaking_state();
    let mut handler = DefaultKeyHandler::new(create_default_keymap());

    handle_keys(b"\x1b[C\x1b[C", &mut state, &mut handler, Instant::now()).unwrap();
    assert_eq!(state.pager.number(), 3);
}

#[test]
fn test_typed_digits_in_one_read() {
    let start = Instant::now();
    let (mut state, spoken) = speaking_state();
    let mut handler = DefaultKeyHandler::new(create_default_keymap());

    handle_keys(b"12", &mut state, &mut handler, start).unwrap();
    assert_eq!(state.selected, 1);

    // The second key supersedes the first
    state.tick(start + Duration::from_millis(100)).unwrap();
    assert_eq!(*spoken.lock().unwrap(), vec!["goodbye".to_string()]);
}

#[test]
fn test_keys_after_quit_are_ignored() {
    let (mut state, _) = speaking_state();
    let mut handler = DefaultKeyHandler::new(create_default_keymap());

    handle_keys(b"q\x1b[C", &mut state, &mut handler, Instant::now()).unwrap();
    assert!(!state.is_running());
    assert_eq!(state.pager.number(), 1);
}

#[test]
fn test_confirmation_answered_in_same_read() {
    let (mut state, _) = speaking_state();
    let mut handler = DefaultKeyHandler::new(create_default_keymap());

    handle_keys(b"ly", &mut state, &mut handler, Instant::now()).unwrap();
    assert_eq!(state.lesson.pages[0].words[0].status, WordStatus::Known);
    assert!(state.handlers.is_empty());
}
