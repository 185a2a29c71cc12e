//! Speech synthesis and pronunciation

pub mod backends;
pub mod policy;
pub mod pronouncer;
pub mod request;
pub mod synth;
pub mod voice;

pub use policy::{NameMatch, PolicyKind, VoicePolicy, VoicePredicate};
pub use pronouncer::{Acknowledgment, Pronouncer};
pub use request::{Prosody, PronunciationProfile, PronunciationRequest, REQUEST_LANGUAGE};
pub use synth::{create_synth, BackendChoice, Synth, UtteranceEvent};
pub use voice::{Voice, VoiceCatalog};
