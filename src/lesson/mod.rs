//! Lesson content
//!
//! A lesson is a short run of pages, each with a word bank and practice
//! sentences. Sentences mark pronounceable words with brackets, as in
//! `"I see a [cat]."`; the brackets are stripped for display and speech.

pub mod materials;
pub mod pager;
pub mod words;

pub use materials::Material;
pub use pager::{PageTurn, Pager};
pub use words::{WordStatus, WordTag};

use crate::{LessonError, Result};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A bracketed word inside a sentence
static MARKED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]").expect("marked word pattern is valid"));

/// A complete lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    pub pages: Vec<Page>,
}

/// One page of a lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    #[serde(default)]
    pub words: Vec<WordTag>,
    #[serde(default)]
    pub sentences: Vec<String>,
}

/// What a pronounceable item on a page refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Entry in the page's word bank, by index
    Word(usize),
    /// A whole practice sentence
    Sentence,
    /// A bracketed word that isn't in the word bank
    MarkedWord,
}

/// Something on a page that can be pronounced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
    pub text: String,
}

/// Strip bracket markers from a sentence
pub fn plain_text(sentence: &str) -> String {
    MARKED_WORD.replace_all(sentence, "$1").to_string()
}

/// Words marked with brackets in a sentence, trimmed
pub fn marked_words(sentence: &str) -> Vec<String> {
    MARKED_WORD
        .captures_iter(sentence)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

impl Page {
    pub fn new(title: impl Into<String>, words: &[&str], sentences: &[&str]) -> Self {
        Self {
            title: title.into(),
            words: words.iter().map(|w| WordTag::new(*w)).collect(),
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Pronounceable items: word bank, then sentences, then extra marked words
    pub fn items(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .words
            .iter()
            .enumerate()
            .map(|(i, tag)| Item {
                kind: ItemKind::Word(i),
                text: tag.text.clone(),
            })
            .collect();

        items.extend(self.sentences.iter().map(|s| Item {
            kind: ItemKind::Sentence,
            text: plain_text(s),
        }));

        for sentence in &self.sentences {
            for word in marked_words(sentence) {
                let seen = items.iter().any(|item| {
                    item.kind != ItemKind::Sentence && item.text.eq_ignore_ascii_case(&word)
                });
                if !seen {
                    items.push(Item {
                        kind: ItemKind::MarkedWord,
                        text: word,
                    });
                }
            }
        }

        items
    }
}

impl Lesson {
    /// Parse a lesson from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let lesson: Lesson = serde_json::from_str(json)?;
        lesson.validate()?;
        Ok(lesson)
    }

    /// Load a lesson file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading lesson from {:?}", path);
        let json = std::fs::read_to_string(path)?;
        let lesson = Self::from_json(&json)?;
        info!("Loaded lesson '{}' with {} pages", lesson.title, lesson.pages.len());
        Ok(lesson)
    }

    fn validate(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(LessonError::Lesson(format!(
                "lesson '{}' has no pages",
                self.title
            )));
        }
        Ok(())
    }

    /// The lesson shipped with the player
    pub fn builtin() -> Self {
        Self {
            title: "Kids English Go Go Go".to_string(),
            pages: vec![
                Page::new(
                    "Hello, friends!",
                    &["hello", "goodbye", "friend"],
                    &["[Hello]! My name is Sam.", "Nice to meet you!"],
                ),
                Page::new(
                    "Animals",
                    &["cat", "dog", "bird", "fish"],
                    &["I see a [cat].", "The [dog] can run.", "A [bird] can fly."],
                ),
                Page::new(
                    "Colors",
                    &["red", "blue", "green", "yellow"],
                    &["The apple is [red].", "The sky is [blue].", "I like [purple]!"],
                ),
                Page::new(
                    "Let's practice!",
                    &[],
                    &[
                        "Hello! I see a [cat].",
                        "The [bird] is [yellow].",
                        "Goodbye, my [friend]!",
                    ],
                ),
            ],
        }
    }
}
