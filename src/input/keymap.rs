//! Default key bindings for the lesson player

use crate::lesson::Material;
use std::collections::HashMap;

/// Key sequence type
pub type KeySequence = Vec<u8>;

/// Action identifier for key bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    // Page navigation
    NextPage,
    PreviousPage,

    // Item selection
    SelectNext,
    SelectPrevious,
    SaySelected,
    /// Pronounce item n (zero-based) on the current page
    SayItem(usize),

    // Word bank
    MarkLearned,

    // Printable materials
    Print(Material),

    Silence,
    Quit,
}

/// Create the default keymap
pub fn create_default_keymap() -> HashMap<KeySequence, KeyAction> {
    let mut map = HashMap::new();

    // Pages: right arrow or space forward, left arrow back
    let forward: [&[u8]; 3] = [b"\x1b[C", b"\x1bOC", b" "];
    for seq in forward {
        map.insert(seq.to_vec(), KeyAction::NextPage);
    }
    let back: [&[u8]; 2] = [b"\x1b[D", b"\x1bOD"];
    for seq in back {
        map.insert(seq.to_vec(), KeyAction::PreviousPage);
    }

    // Selection
    map.insert(b"\x1b[A".to_vec(), KeyAction::SelectPrevious);
    map.insert(b"\x1bOA".to_vec(), KeyAction::SelectPrevious);
    map.insert(b"\x1b[B".to_vec(), KeyAction::SelectNext);
    map.insert(b"\x1bOB".to_vec(), KeyAction::SelectNext);
    map.insert(b"\r".to_vec(), KeyAction::SaySelected);
    map.insert(b"\n".to_vec(), KeyAction::SaySelected);

    // Digits 1-9 say items directly
    for n in 1..=9u8 {
        map.insert(vec![b'0' + n], KeyAction::SayItem(usize::from(n - 1)));
    }

    map.insert(b"l".to_vec(), KeyAction::MarkLearned);

    map.insert(b"C".to_vec(), KeyAction::Print(Material::ColoringPages));
    map.insert(b"F".to_vec(), KeyAction::Print(Material::Flashcards));
    map.insert(b"M".to_vec(), KeyAction::Print(Material::MatchingGame));
    map.insert(b"R".to_vec(), KeyAction::Print(Material::ProgressChart));

    map.insert(b"x".to_vec(), KeyAction::Silence);
    map.insert(b"q".to_vec(), KeyAction::Quit);
    map.insert(b"\x03".to_vec(), KeyAction::Quit); // Ctrl+C in raw mode

    map
}
