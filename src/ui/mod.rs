//! Transient overlays drawn over the lesson page

pub mod render;

pub use render::{render_screen, Frame, PageView};

use log::debug;

/// Identifies an overlay so timers can close the right one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

/// What an overlay shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayKind {
    /// Pronounced text with the "Listen and repeat!" caption
    Pronunciation(String),
    /// End-of-lesson celebration
    Celebration,
    /// Brief full-width flash after learning a word
    SuccessFlash,
    /// Message that stays until its timer runs out
    Alert(String),
    /// Question waiting for a y/n answer
    Prompt(String),
}

/// Overlays either show normally or play their exit before removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Visible,
    Closing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub id: OverlayId,
    pub kind: OverlayKind,
    pub phase: Phase,
}

/// Overlays currently on screen, oldest first
#[derive(Debug, Default)]
pub struct Overlays {
    items: Vec<Overlay>,
    next_id: u64,
}

impl Overlays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a new overlay and return its id
    ///
    /// Only one pronunciation popup exists at a time; a new one replaces it.
    pub fn show(&mut self, kind: OverlayKind) -> OverlayId {
        if matches!(kind, OverlayKind::Pronunciation(_)) {
            self.items
                .retain(|o| !matches!(o.kind, OverlayKind::Pronunciation(_)));
        }

        self.next_id += 1;
        let id = OverlayId(self.next_id);
        debug!("Showing overlay {:?}: {:?}", id, kind);
        self.items.push(Overlay {
            id,
            kind,
            phase: Phase::Visible,
        });
        id
    }

    /// Start an overlay's exit; returns false if it is already gone
    pub fn close(&mut self, id: OverlayId) -> bool {
        match self.items.iter_mut().find(|o| o.id == id) {
            Some(overlay) => {
                overlay.phase = Phase::Closing;
                true
            }
            None => false,
        }
    }

    /// Remove an overlay; returns false if it is already gone
    pub fn remove(&mut self, id: OverlayId) -> bool {
        let before = self.items.len();
        self.items.retain(|o| o.id != id);
        self.items.len() != before
    }

    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.items.iter().find(|o| o.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pronunciation_popup_replaces_previous() {
        let mut overlays = Overlays::new();
        let first = overlays.show(OverlayKind::Pronunciation("cat".into()));
        let alert = overlays.show(OverlayKind::Alert("hi".into()));
        let second = overlays.show(OverlayKind::Pronunciation("dog".into()));

        assert_eq!(overlays.len(), 2);
        assert!(overlays.get(first).is_none());
        assert!(overlays.get(alert).is_some());
        assert_eq!(
            overlays.get(second).map(|o| &o.kind),
            Some(&OverlayKind::Pronunciation("dog".into()))
        );
    }

    #[test]
    fn test_close_then_remove() {
        let mut overlays = Overlays::new();
        let id = overlays.show(OverlayKind::Celebration);
        assert!(overlays.close(id));
        assert_eq!(overlays.get(id).map(|o| o.phase), Some(Phase::Closing));
        assert!(overlays.remove(id));
        assert!(!overlays.remove(id));
        assert!(!overlays.close(id));
        assert!(overlays.is_empty());
    }
}
