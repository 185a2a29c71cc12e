//! Default key handler for the lesson player
//!
//! Maps keys to lesson actions: page turns, item selection, pronunciation,
//! word marking and the printable-material announcements.

use super::{HandlerAction, KeyAction};
use crate::state::State;
use crate::Result;
use log::{debug, trace};
use std::collections::HashMap;
use std::time::Instant;

/// Default key handler for lesson commands
pub struct DefaultKeyHandler {
    /// Key bindings map
    keymap: HashMap<Vec<u8>, KeyAction>,
}

impl DefaultKeyHandler {
    pub fn new(keymap: HashMap<Vec<u8>, KeyAction>) -> Self {
        debug!(
            "Creating default key handler with {} bindings",
            keymap.len()
        );
        Self { keymap }
    }

    /// Process a key with the lesson key bindings
    ///
    /// Unbound keys are reported as `Passthrough` and otherwise ignored.
    pub fn process_key(
        &mut self,
        key: &[u8],
        state: &mut State,
        now: Instant,
    ) -> Result<HandlerAction> {
        match self.keymap.get(key).cloned() {
            Some(action) => {
                trace!("Key action: {:?}", action);
                self.execute_action(&action, state, now)
            }
            None => {
                trace!("Unbound key: {:?}", key);
                Ok(HandlerAction::Passthrough)
            }
        }
    }

    fn execute_action(
        &mut self,
        action: &KeyAction,
        state: &mut State,
        now: Instant,
    ) -> Result<HandlerAction> {
        use KeyAction::*;

        match action {
            NextPage => state.next_page(now),
            PreviousPage => state.previous_page(),
            SelectNext => state.select_next(),
            SelectPrevious => state.select_previous(),
            SaySelected => {
                state.pronounce_selected(now);
            }
            SayItem(index) => {
                if !state.pronounce_item(*index, now) {
                    debug!("No item {} on this page", index + 1);
                }
            }
            MarkLearned => {
                if !state.request_mark_learned() {
                    debug!("Selected item is not a new word");
                }
            }
            Print(material) => state.show_material(*material, now),
            Silence => state.silence()?,
            Quit => state.quit(),
        }

        Ok(HandlerAction::Handled)
    }
}
