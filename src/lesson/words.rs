//! Word tags and their learned status

use log::info;
use serde::{Deserialize, Serialize};

/// Whether the learner already knows a word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    #[default]
    New,
    Known,
}

/// A word in a page's word bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTag {
    pub text: String,
    #[serde(default)]
    pub status: WordStatus,
}

impl WordTag {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: WordStatus::New,
        }
    }

    pub fn is_new(&self) -> bool {
        self.status == WordStatus::New
    }

    /// Move a new word to known; returns false if it was already known
    pub fn mark_learned(&mut self) -> bool {
        if !self.is_new() {
            return false;
        }
        self.status = WordStatus::Known;
        info!("Word learned: {}", self.text);
        true
    }
}

/// Count of (known, total) words across tags
pub fn progress(tags: &[WordTag]) -> (usize, usize) {
    let known = tags.iter().filter(|t| !t.is_new()).count();
    (known, tags.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_learned_once() {
        let mut tag = WordTag::new("cat");
        assert!(tag.is_new());
        assert!(tag.mark_learned());
        assert_eq!(tag.status, WordStatus::Known);
        assert!(!tag.mark_learned());
    }

    #[test]
    fn test_status_serde() {
        let tag: WordTag = serde_json::from_str(r#"{"text":"dog","status":"known"}"#).unwrap();
        assert_eq!(tag.status, WordStatus::Known);

        let tag: WordTag = serde_json::from_str(r#"{"text":"bird"}"#).unwrap();
        assert_eq!(tag.status, WordStatus::New);
    }

    #[test]
    fn test_progress() {
        let mut tags = vec![WordTag::new("red"), WordTag::new("blue")];
        assert_eq!(progress(&tags), (0, 2));
        tags[1].mark_learned();
        assert_eq!(progress(&tags), (1, 2));
    }
}
