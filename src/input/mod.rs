//! Input handling and key bindings
//!
//! The input system uses a stack-based handler architecture where handlers
//! can be pushed/popped to create modal interfaces (e.g. confirmation
//! prompts). Keys the top handler passes through reach the default bindings.

pub mod confirm_handler;
pub mod default_handler;
pub mod handler;
pub mod keymap;

pub use confirm_handler::ConfirmHandler;
pub use default_handler::DefaultKeyHandler;
pub use handler::{HandlerAction, HandlerStack, KeyHandler};
pub use keymap::{create_default_keymap, KeyAction};

use crate::state::State;
use crate::Result;
use std::time::Instant;

/// Split a chunk of terminal input into individual keys
///
/// Auto-repeat and fast typing can deliver several keys in one read. A key
/// is a CSI sequence (`ESC [` up to its final byte), an SS3 sequence
/// (`ESC O` plus one byte), ESC plus one byte, or one UTF-8 character.
pub fn split_keys(input: &[u8]) -> Vec<&[u8]> {
    let mut keys = Vec::new();
    let mut start = 0;

    while start < input.len() {
        let len = match &input[start..] {
            [0x1b, b'[', rest @ ..] => {
                // Parameters and intermediates run until a final byte 0x40-0x7e
                match rest.iter().position(|b| (0x40..=0x7e).contains(b)) {
                    Some(end) => end + 3,
                    None => input.len() - start,
                }
            }
            [0x1b, b'O', _, ..] => 3,
            [0x1b, next, ..] if *next != 0x1b => 2,
            [first, ..] => utf8_len(*first).min(input.len() - start),
            [] => break,
        };
        keys.push(&input[start..start + len]);
        start += len;
    }

    keys
}

/// Route every key in a chunk of input, stopping once the player quits
pub fn handle_keys(
    input: &[u8],
    state: &mut State,
    default_handler: &mut DefaultKeyHandler,
    now: Instant,
) -> Result<()> {
    for key in split_keys(input) {
        if !state.is_running() {
            break;
        }
        handle_input(key, state, default_handler, now)?;
    }
    Ok(())
}

fn utf8_len(first: u8) -> usize {
    match first {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

/// Route one key of keyboard input through the modal stack and default bindings
pub fn handle_input(
    input: &[u8],
    state: &mut State,
    default_handler: &mut DefaultKeyHandler,
    now: Instant,
) -> Result<HandlerAction> {
    // Temporarily pop the handler so it can borrow the state mutably
    if let Some(mut handler) = state.handlers.pop() {
        let action = handler.process(input, state, now)?;
        match action {
            HandlerAction::Remove => return Ok(action),
            HandlerAction::Handled => {
                state.handlers.push(handler);
                return Ok(action);
            }
            HandlerAction::Passthrough => state.handlers.push(handler),
        }
    }

    default_handler.process_key(input, state, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_repeated_arrows() {
        assert_eq!(split_keys(b"\x1b[C\x1b[C"), vec![&b"\x1b[C"[..], &b"\x1b[C"[..]]);
        assert_eq!(split_keys(b"\x1bOA\x1b[B"), vec![&b"\x1bOA"[..], &b"\x1b[B"[..]]);
    }

    #[test]
    fn test_split_plain_and_mixed_keys() {
        assert_eq!(split_keys(b"12"), vec![&b"1"[..], &b"2"[..]]);
        assert_eq!(split_keys(b"\x1b[1;5Cq"), vec![&b"\x1b[1;5C"[..], &b"q"[..]]);
        assert_eq!(split_keys(b"\x1b"), vec![&b"\x1b"[..]]);
        assert_eq!(split_keys(b"\x1b\x1b[D"), vec![&b"\x1b"[..], &b"\x1b[D"[..]]);
        assert_eq!(split_keys("é ".as_bytes()), vec!["é".as_bytes(), &b" "[..]]);
        assert!(split_keys(b"").is_empty());
    }
}
