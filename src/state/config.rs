//! Configuration management

use crate::speech::{BackendChoice, PolicyKind};
use crate::{LessonError, Result};
use ini::Ini;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;

/// Lesson player configuration
///
/// Settings persist in an INI file (~/.kidsenglish.cfg); a default file is
/// written the first time the player runs.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default path, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from `path`, creating it if missing
    pub fn load_from(path: PathBuf) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| LessonError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| LessonError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// In-memory configuration with default values
    pub fn defaults() -> Self {
        Self {
            ini: Self::default_config(),
            path: Self::config_path(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| LessonError::Config(format!("Failed to save config: {}", e)))
    }

    /// Get config file path (~/.kidsenglish.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".kidsenglish.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("profile", "general")
            .set("backend", "auto")
            .set("voice_poll_ms", "100")
            .set("dispatch_delay_ms", "100");

        ini.with_section(Some("display"))
            .set("popup_ms", "2000")
            .set("celebration_delay_ms", "500")
            .set("celebration_ms", "3000")
            .set("flash_ms", "500")
            .set("alert_ms", "3000");

        ini.with_section(Some("lesson"));

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an unsigned integer value from config
    pub fn get_u64(&self, section: &str, key: &str, default: u64) -> u64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    fn millis(&self, section: &str, key: &str, default: u64) -> Duration {
        Duration::from_millis(self.get_u64(section, key, default))
    }

    /// Which voice policy and prosody to use
    pub fn profile(&self) -> PolicyKind {
        let value = self.get_string("speech", "profile", "general");
        value.parse().unwrap_or_else(|e| {
            warn!("{}; using general profile", e);
            PolicyKind::General
        })
    }

    /// Which speech backend to use
    pub fn backend(&self) -> BackendChoice {
        let value = self.get_string("speech", "backend", "auto");
        value.parse().unwrap_or_else(|e| {
            warn!("{}; detecting backend automatically", e);
            BackendChoice::Auto
        })
    }

    /// Interval between voice catalog polls while none are listed
    pub fn voice_poll_interval(&self) -> Duration {
        self.millis("speech", "voice_poll_ms", 100)
    }

    /// Delay between a pronounce request and the speech it triggers
    pub fn dispatch_delay(&self) -> Duration {
        self.millis("speech", "dispatch_delay_ms", 100)
    }

    /// How long the pronunciation popup stays up
    pub fn popup_duration(&self) -> Duration {
        self.millis("display", "popup_ms", 2000)
    }

    /// Pause between reaching the last page and the celebration
    pub fn celebration_delay(&self) -> Duration {
        self.millis("display", "celebration_delay_ms", 500)
    }

    pub fn celebration_duration(&self) -> Duration {
        self.millis("display", "celebration_ms", 3000)
    }

    pub fn flash_duration(&self) -> Duration {
        self.millis("display", "flash_ms", 500)
    }

    pub fn alert_duration(&self) -> Duration {
        self.millis("display", "alert_ms", 3000)
    }

    /// Lesson file to load instead of the built-in lesson
    pub fn lesson_file(&self) -> Option<PathBuf> {
        self.ini
            .get_from(Some("lesson"), "file")
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::defaults();
        assert_eq!(config.profile(), PolicyKind::General);
        assert_eq!(config.backend(), BackendChoice::Auto);
        assert_eq!(config.voice_poll_interval(), Duration::from_millis(100));
        assert_eq!(config.dispatch_delay(), Duration::from_millis(100));
        assert_eq!(config.popup_duration(), Duration::from_secs(2));
        assert_eq!(config.celebration_delay(), Duration::from_millis(500));
        assert_eq!(config.celebration_duration(), Duration::from_secs(3));
        assert_eq!(config.flash_duration(), Duration::from_millis(500));
        assert!(config.lesson_file().is_none());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let mut config = Config::defaults();
        config.set("speech", "profile", "grownup");
        config.set("speech", "backend", "sapi");
        config.set("display", "popup_ms", "soon");
        config.set("lesson", "file", "   ");

        assert_eq!(config.profile(), PolicyKind::General);
        assert_eq!(config.backend(), BackendChoice::Auto);
        assert_eq!(config.popup_duration(), Duration::from_secs(2));
        assert!(config.lesson_file().is_none());
    }
}
