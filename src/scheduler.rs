//! Timer queue for the event loop
//!
//! Everything time-based in the lesson player (voice catalog polling, the
//! short delay before speech is dispatched, popup lifetimes, the delayed
//! celebration) is a `Task` due at an `Instant`. The event loop sleeps until
//! the next task is due and then runs every task whose time has come.

use crate::ui::OverlayId;
use log::trace;
use std::time::{Duration, Instant};

/// Work the event loop performs when a timer fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Re-read the voice catalog from the speech backend
    RefreshCatalog,
    /// Speak the pending request if it is still the latest one
    Dispatch { generation: u64 },
    /// Move an overlay into its closing phase
    CloseOverlay(OverlayId),
    /// Remove an overlay from the screen
    RemoveOverlay(OverlayId),
    /// Show the end-of-lesson celebration
    ShowCelebration,
}

/// Pending tasks ordered by due time
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<(Instant, Task)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` has passed since `now`
    pub fn schedule(&mut self, now: Instant, delay: Duration, task: Task) {
        trace!("Scheduling {:?} in {:?}", task, delay);
        self.pending.push((now + delay, task));
    }

    /// Remove and return every task due at `now`, earliest first
    ///
    /// Tasks due at the same instant keep the order they were scheduled in.
    pub fn take_due(&mut self, now: Instant) -> Vec<Task> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if now >= self.pending[i].0 {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }

        due.sort_by_key(|(when, _)| *when);
        due.into_iter().map(|(_, task)| task).collect()
    }

    /// Time until the next task is due, `None` if nothing is scheduled
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        let next = self.pending.iter().map(|(when, _)| *when).min()?;
        Some(next.saturating_duration_since(now))
    }

    /// Drop pending tasks matching `predicate`
    pub fn cancel_where<F>(&mut self, predicate: F)
    where
        F: Fn(&Task) -> bool,
    {
        self.pending.retain(|(_, task)| !predicate(task));
    }

    /// Is a task equal to `task` pending?
    pub fn contains(&self, task: &Task) -> bool {
        self.pending.iter().any(|(_, t)| t == task)
    }

    /// Is any pending task matching `predicate`?
    pub fn contains_where<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Task) -> bool,
    {
        self.pending.iter().any(|(_, t)| predicate(t))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
