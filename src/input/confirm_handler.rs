//! Confirmation handler for yes/no questions
//!
//! Pushed onto the handler stack while a question is on screen; the next
//! key answers it. `y` or `Y` accepts, anything else declines.

use super::{HandlerAction, KeyHandler};
use crate::state::State;
use crate::Result;
use log::debug;
use std::time::Instant;

/// Callback invoked with the answer
type OnAnswerFn = Box<dyn FnOnce(bool, &mut State, Instant) -> Result<()> + Send>;

/// Handler that waits for a single y/n key
pub struct ConfirmHandler {
    on_answer: Option<OnAnswerFn>,
}

impl ConfirmHandler {
    /// Create a confirm handler; the callback runs once with the answer
    pub fn new(on_answer: OnAnswerFn) -> Self {
        Self {
            on_answer: Some(on_answer),
        }
    }
}

impl KeyHandler for ConfirmHandler {
    fn process(&mut self, key: &[u8], state: &mut State, now: Instant) -> Result<HandlerAction> {
        let accepted = matches!(key, b"y" | b"Y");
        debug!("ConfirmHandler: answered {}", if accepted { "yes" } else { "no" });

        if let Some(callback) = self.on_answer.take() {
            callback(accepted, state, now)?;
        }

        Ok(HandlerAction::Remove)
    }
}
