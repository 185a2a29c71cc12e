//! Voice selection policies
//!
//! A policy is an ordered list of predicates. Each predicate is tried against
//! the whole catalog before the next one is considered, so a later voice
//! matching an earlier predicate beats an earlier voice matching a later one.
//! Only English voices are ever eligible.

use super::voice::Voice;
use std::fmt;
use std::str::FromStr;

/// Name-substring test with its own case handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch {
    needles: Vec<String>,
    case_sensitive: bool,
}

impl NameMatch {
    /// Match names containing any needle exactly as written
    pub fn case_sensitive(needles: &[&str]) -> Self {
        Self {
            needles: needles.iter().map(|n| n.to_string()).collect(),
            case_sensitive: true,
        }
    }

    /// Match names containing any needle, ignoring case
    pub fn case_insensitive(needles: &[&str]) -> Self {
        Self {
            needles: needles.iter().map(|n| n.to_lowercase()).collect(),
            case_sensitive: false,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.case_sensitive {
            self.needles.iter().any(|n| name.contains(n.as_str()))
        } else {
            let lower = name.to_lowercase();
            self.needles.iter().any(|n| lower.contains(n.as_str()))
        }
    }
}

/// One tier of a voice policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoicePredicate {
    /// English voice whose name passes the test
    Named(NameMatch),
    /// Any English voice
    AnyEnglish,
}

impl VoicePredicate {
    pub fn matches(&self, voice: &Voice) -> bool {
        if !voice.is_english() {
            return false;
        }
        match self {
            VoicePredicate::Named(test) => test.matches(&voice.name),
            VoicePredicate::AnyEnglish => true,
        }
    }
}

/// Named policy configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Lesson pages: branded or female voices, matched case-sensitively
    General,
    /// Kid pages: child-like and female voices first, matched ignoring case
    Kid,
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" | "lesson" => Ok(PolicyKind::General),
            "kid" | "kids" => Ok(PolicyKind::Kid),
            other => Err(format!("unknown voice profile '{}'", other)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::General => write!(f, "general"),
            PolicyKind::Kid => write!(f, "kid"),
        }
    }
}

/// Ordered predicate list used to pick the best voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePolicy {
    tiers: Vec<VoicePredicate>,
}

impl VoicePolicy {
    pub fn new(tiers: Vec<VoicePredicate>) -> Self {
        Self { tiers }
    }

    /// Policy A: "Female", "Google" or "Microsoft", then any English voice
    pub fn general() -> Self {
        Self::new(vec![
            VoicePredicate::Named(NameMatch::case_sensitive(&[
                "Female",
                "Google",
                "Microsoft",
            ])),
            VoicePredicate::AnyEnglish,
        ])
    }

    /// Policy B: child-like, then female, then branded, then any English voice
    pub fn kid() -> Self {
        Self::new(vec![
            VoicePredicate::Named(NameMatch::case_insensitive(&["child", "kid", "young"])),
            VoicePredicate::Named(NameMatch::case_insensitive(&[
                "female", "zira", "susan", "aria",
            ])),
            VoicePredicate::Named(NameMatch::case_sensitive(&["Google", "Microsoft"])),
            VoicePredicate::AnyEnglish,
        ])
    }

    pub fn for_kind(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::General => Self::general(),
            PolicyKind::Kid => Self::kid(),
        }
    }

    pub fn tiers(&self) -> &[VoicePredicate] {
        &self.tiers
    }

    /// Pick the best voice, or `None` if no English voice is listed
    pub fn select_voice<'a>(&self, catalog: &'a [Voice]) -> Option<&'a Voice> {
        self.select_with_tier(catalog).map(|(voice, _)| voice)
    }

    /// Like `select_voice`, also reporting which tier (0-based) matched
    pub fn select_with_tier<'a>(&self, catalog: &'a [Voice]) -> Option<(&'a Voice, usize)> {
        self.tiers.iter().enumerate().find_map(|(tier, predicate)| {
            catalog
                .iter()
                .find(|voice| predicate.matches(voice))
                .map(|voice| (voice, tier))
        })
    }
}
