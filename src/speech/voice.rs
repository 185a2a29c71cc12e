//! Synthetic voices and the catalog the host makes available

use std::fmt;

/// Language tag prefix every selectable voice must carry
pub const ENGLISH_PREFIX: &str = "en";

/// A synthetic speech persona listed by a speech backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Backend-specific identifier used to hand the voice back to its backend
    pub id: String,

    /// Human readable name, e.g. "Microsoft Zira"
    pub name: String,

    /// Language tag, e.g. "en-US"
    pub language: String,
}

impl Voice {
    /// Create a voice whose id is its name
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            language: language.into(),
        }
    }

    /// Create a voice with an explicit backend id
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
        }
    }

    /// Does this voice speak some variety of English?
    pub fn is_english(&self) -> bool {
        self.language.starts_with(ENGLISH_PREFIX)
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.language)
    }
}

/// Ordered list of voices, refreshed as the backend reports them
///
/// The catalog may be empty until the backend has finished loading its
/// voices; it is replaced wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog contents
    pub fn replace(&mut self, voices: Vec<Voice>) {
        self.voices = voices;
    }

    /// Voices in the order the backend listed them
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    /// Names of all voices, for logging
    pub fn names(&self) -> Vec<&str> {
        self.voices.iter().map(|v| v.name.as_str()).collect()
    }
}

impl From<Vec<Voice>> for VoiceCatalog {
    fn from(voices: Vec<Voice>) -> Self {
        Self { voices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_english() {
        assert!(Voice::new("Samantha", "en-US").is_english());
        assert!(Voice::new("Daniel", "en-GB").is_english());
        assert!(Voice::new("Plain", "en").is_english());
        assert!(!Voice::new("Thomas", "fr-FR").is_english());
        // Tags are matched as written, not normalised
        assert!(!Voice::new("Shouty", "EN-US").is_english());
    }

    #[test]
    fn test_catalog_replace() {
        let mut catalog = VoiceCatalog::new();
        assert!(catalog.is_empty());

        catalog.replace(vec![
            Voice::new("Samantha", "en-US"),
            Voice::new("Anna", "de-DE"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names(), vec!["Samantha", "Anna"]);

        catalog.replace(Vec::new());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_display() {
        let voice = Voice::with_id("com.apple.samantha", "Samantha", "en-US");
        assert_eq!(voice.to_string(), "Samantha (en-US)");
        assert_eq!(voice.id, "com.apple.samantha");
    }
}
