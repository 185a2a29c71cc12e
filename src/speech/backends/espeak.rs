//! espeak-ng backend
//!
//! Speaks by spawning one espeak-ng process per utterance. Used on WSL with
//! WSLg, where PulseAudio is reachable through /mnt/wslg/PulseServer but
//! Speech Dispatcher usually isn't installed, and as a fallback elsewhere.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)
//! - PulseAudio client libraries (usually pre-installed with WSLg)

use crate::platform::{is_wsl, pulse_server};
use crate::speech::{Prosody, PronunciationRequest, Synth, UtteranceEvent, Voice};
use crate::{LessonError, Result};
use log::{debug, error, info, warn};
use std::process::{Child, Command, Stdio};

/// espeak-ng defaults that a multiplier of 1.0 maps onto
const NORMAL_SPEED_WPM: f32 = 175.0;
const NORMAL_PITCH: f32 = 50.0;
const NORMAL_AMPLITUDE: f32 = 100.0;

/// espeak-ng backend
pub struct EspeakSynth {
    /// Currently running espeak-ng process
    current_process: Option<Child>,

    /// Path to espeak-ng
    espeak_path: String,

    /// PULSE_SERVER passed to every spawned process
    pulse: Option<String>,

    /// Events waiting to be drained
    events: Vec<UtteranceEvent>,
}

impl EspeakSynth {
    /// Create a new espeak-ng synthesizer
    ///
    /// Verifies espeak-ng is installed and, on WSL, that PulseAudio is reachable
    pub fn new() -> Result<Self> {
        debug!("Creating espeak-ng backend");

        let pulse = pulse_server();
        match &pulse {
            Some(server) => info!("Using PulseAudio server at {}", server),
            None if is_wsl() => {
                warn!("WSLg PulseAudio server not found");
                warn!("Make sure WSLg is installed and running, or set PULSE_SERVER");
                return Err(LessonError::Speech(
                    "PulseAudio server not found. Install WSLg or set PULSE_SERVER environment variable.".to_string(),
                ));
            }
            None => debug!("PulseAudio will use default configuration"),
        }

        let espeak_path = Self::find_espeak()?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self {
            current_process: None,
            espeak_path,
            pulse,
            events: Vec::new(),
        })
    }

    /// Find espeak-ng executable
    fn find_espeak() -> Result<String> {
        let paths = ["espeak-ng", "/usr/bin/espeak-ng"];

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(LessonError::Speech(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// Convert a rate multiplier to espeak speed (80-450 wpm)
    fn speed(prosody: &Prosody) -> u16 {
        (NORMAL_SPEED_WPM * prosody.rate).clamp(80.0, 450.0).round() as u16
    }

    /// Convert a pitch multiplier to espeak pitch (0-99)
    fn pitch(prosody: &Prosody) -> u8 {
        (NORMAL_PITCH * prosody.pitch).clamp(0.0, 99.0).round() as u8
    }

    /// Convert a volume multiplier to espeak amplitude (0-200)
    fn amplitude(prosody: &Prosody) -> u8 {
        (NORMAL_AMPLITUDE * prosody.volume).clamp(0.0, 200.0).round() as u8
    }

    /// Parse `espeak-ng --voices` output
    ///
    /// Columns: Pty Language Age/Gender VoiceName File Other-Languages
    fn parse_voice_list(output: &str) -> Vec<Voice> {
        output
            .lines()
            .skip(1)
            .filter_map(|line| {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() < 5 {
                    return None;
                }
                // `-v` takes the voice file, not the underscored display name
                let language = fields[1];
                let name = fields[3].replace('_', " ");
                let file = fields[4];
                Some(Voice::with_id(file, name, language))
            })
            .collect()
    }

    /// Reap a finished process and record how it ended
    fn poll_process(&mut self) {
        let finished = match self.current_process.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(Some(status)) if status.success() => Some(UtteranceEvent::Ended),
                Ok(Some(status)) => Some(UtteranceEvent::Failed(format!(
                    "espeak-ng exited with {}",
                    status
                ))),
                Ok(None) => None,
                Err(e) => Some(UtteranceEvent::Failed(e.to_string())),
            },
            None => None,
        };

        if let Some(event) = finished {
            self.current_process = None;
            self.events.push(event);
        }
    }

    /// Kill any currently running speech process
    fn cancel_process(&mut self) {
        if let Some(mut child) = self.current_process.take() {
            debug!("Killing espeak-ng process");
            match child.kill() {
                Ok(_) => {
                    let _ = child.wait();
                    self.events.push(UtteranceEvent::Ended);
                }
                Err(e) => {
                    debug!("Failed to kill espeak-ng process: {}", e);
                }
            }
        }
    }
}

impl Synth for EspeakSynth {
    fn name(&self) -> &str {
        "espeak-ng"
    }

    fn voices(&mut self) -> Result<Vec<Voice>> {
        let output = Command::new(&self.espeak_path)
            .arg("--voices")
            .stderr(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(LessonError::Speech(format!(
                "espeak-ng --voices exited with {}",
                output.status
            )));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(Self::parse_voice_list(&listing))
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.cancel_process();
        Ok(())
    }

    fn speak(&mut self, request: &PronunciationRequest) -> Result<()> {
        if request.text.is_empty() {
            return Ok(());
        }

        self.cancel_process();

        let voice = request
            .voice()
            .map(|v| v.id.as_str())
            .unwrap_or(request.language);

        let mut cmd = Command::new(&self.espeak_path);
        cmd.arg("-v").arg(voice);
        cmd.arg("-s").arg(Self::speed(&request.prosody).to_string());
        cmd.arg("-p").arg(Self::pitch(&request.prosody).to_string());
        cmd.arg("-a").arg(Self::amplitude(&request.prosody).to_string());
        cmd.arg("--").arg(&request.text);

        if let Some(server) = &self.pulse {
            cmd.env("PULSE_SERVER", server);
        }
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        debug!("Speaking: {}", request.text);
        match cmd.spawn() {
            Ok(child) => {
                self.current_process = Some(child);
                self.events.push(UtteranceEvent::Started);
                Ok(())
            }
            Err(e) => {
                error!("Failed to spawn espeak-ng: {}", e);
                Err(LessonError::Speech(format!("Failed to start espeak-ng: {}", e)))
            }
        }
    }

    fn reports_utterance_end(&self) -> bool {
        true
    }

    fn drain_events(&mut self) -> Vec<UtteranceEvent> {
        self.poll_process();
        std::mem::take(&mut self.events)
    }
}

impl Drop for EspeakSynth {
    fn drop(&mut self) {
        debug!("Shutting down espeak-ng backend");
        self.cancel_process();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prosody_conversion() {
        let normal = Prosody::default();
        assert_eq!(EspeakSynth::speed(&normal), 175);
        assert_eq!(EspeakSynth::pitch(&normal), 50);
        assert_eq!(EspeakSynth::amplitude(&normal), 100);

        let kid = Prosody {
            rate: 0.5,
            pitch: 1.4,
            volume: 1.0,
        };
        // 87.5 wpm rounds up; pitch 70
        assert_eq!(EspeakSynth::speed(&kid), 88);
        assert_eq!(EspeakSynth::pitch(&kid), 70);

        let extreme = Prosody {
            rate: 0.1,
            pitch: 3.0,
            volume: 5.0,
        };
        assert_eq!(EspeakSynth::speed(&extreme), 80);
        assert_eq!(EspeakSynth::pitch(&extreme), 99);
        assert_eq!(EspeakSynth::amplitude(&extreme), 200);
    }

    #[test]
    fn test_parse_voice_list() {
        let listing = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 2  en-gb           --/M      English_(Great_Britain) gmw/en           (en 2)
 2  en-us           --/M      English_(America)  gmw/en-US            (en 3)
garbage
";
        let voices = EspeakSynth::parse_voice_list(listing);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1].name, "English (Great Britain)");
        assert_eq!(voices[1].id, "gmw/en");
        assert_eq!(voices[1].language, "en-gb");
        assert_eq!(voices[2].id, "gmw/en-US");
        assert_eq!(voices[0].id, "gmw/af");
        assert!(!voices[0].is_english());
    }

    #[test]
    fn test_listed_voice_id_is_accepted_by_espeak() {
        let Ok(mut synth) = EspeakSynth::new() else {
            return;
        };
        let Some(voice) = synth
            .voices()
            .ok()
            .and_then(|voices| voices.into_iter().find(Voice::is_english))
        else {
            return;
        };

        // Synthesize to a wave file so no audio device is needed
        let out = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .expect("Failed to create temp file");
        let status = Command::new(&synth.espeak_path)
            .arg("-v")
            .arg(&voice.id)
            .arg("-w")
            .arg(out.path())
            .arg("cat")
            .stderr(Stdio::null())
            .status();
        assert!(status.map(|s| s.success()).unwrap_or(true), "voice {}", voice.id);
    }

    #[test]
    fn test_create_espeak_synth() {
        match EspeakSynth::new() {
            Ok(_) => println!("✓ espeak-ng backend available"),
            Err(e) => println!("⚠ espeak-ng backend not available: {}", e),
        }
    }
}
