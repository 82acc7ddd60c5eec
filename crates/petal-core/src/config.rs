use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(std::io::Error),
    #[error("failed to write config file: {0}")]
    Write(std::io::Error),
    #[error("failed to parse toml: {0}")]
    Parse(toml::de::Error),
    #[error("failed to serialize toml: {0}")]
    Serialize(toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub petal: PetalSection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub vision: VisionSection,
    #[serde(default)]
    pub speech: SpeechSection,
    #[serde(default)]
    pub wiki: WikiSection,
    #[serde(default)]
    pub tui: TuiSection,
}

impl Config {
    pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(ConfigError::Write)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PetalSection {
    pub version: String,
}

impl Default for PetalSection {
    fn default() -> Self {
        PetalSection {
            version: "0.1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StoreSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DefaultsSection {
    #[serde(default)]
    pub extra_dirs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisionSection {
    #[serde(default = "default_blur_threshold")]
    pub blur_threshold: f64,
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    /// Program and leading arguments of the external classifier. The frame's
    /// image path is appended as the last argument.
    #[serde(default)]
    pub classifier_command: Vec<String>,
    /// `class_indices` JSON (`{"Rose": 0, ...}`). When set, the classifier
    /// command reads a preprocessed frame on stdin and prints class scores.
    #[serde(default)]
    pub labels_path: String,
    #[serde(default)]
    pub fixed_label: String,
    #[serde(default)]
    pub source: String,
    /// Minimum time between classified frames in the TUI.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for VisionSection {
    fn default() -> Self {
        VisionSection {
            blur_threshold: default_blur_threshold(),
            input_size: default_input_size(),
            classifier_command: Vec::new(),
            labels_path: String::new(),
            fixed_label: String::new(),
            source: String::new(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

fn default_blur_threshold() -> f64 {
    crate::vision::DEFAULT_BLUR_THRESHOLD
}

fn default_input_size() -> u32 {
    128
}

fn default_frame_interval_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SpeechSection {
    pub command: String,
    pub rate: u32,
    pub voice: String,
}

impl Default for SpeechSection {
    fn default() -> Self {
        SpeechSection {
            command: "espeak".to_string(),
            rate: 150,
            voice: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WikiSection {
    pub base_url: String,
    pub summary_url: String,
}

impl Default for WikiSection {
    fn default() -> Self {
        WikiSection {
            base_url: crate::wiki::DEFAULT_BASE_URL.to_string(),
            summary_url: crate::wiki::DEFAULT_SUMMARY_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TuiSection {
    pub tick_ms: u64,
    pub dark: bool,
}

impl Default for TuiSection {
    fn default() -> Self {
        TuiSection {
            tick_ms: 33,
            dark: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;

    #[test]
    fn config_round_trip() {
        let mut config = Config::default();
        config.vision.classifier_command = vec!["python3".to_string(), "predict.py".to_string()];
        config.defaults.extra_dirs = vec!["~/my-flowers".to_string()];
        config.store.path = Some("/tmp/flowers.db".to_string());

        let toml = toml::to_string(&config).expect("serialize failed");
        let decoded: Config = toml::from_str(&toml).expect("deserialize failed");
        assert_eq!(config, decoded);
    }

    #[test]
    fn partial_vision_section_keeps_defaults() {
        let config: Config =
            toml::from_str("[vision]\nfixed_label = \"Rose\"\n").expect("parse failed");
        assert_eq!(config.vision.fixed_label, "Rose");
        assert_eq!(config.vision.blur_threshold, 100.0);
        assert_eq!(config.vision.input_size, 128);
        assert_eq!(config.vision.frame_interval_ms, 500);
        assert!(config.vision.labels_path.is_empty());
        assert_eq!(config.tui.tick_ms, 33);
    }

    #[test]
    fn partial_tui_speech_and_wiki_sections_keep_defaults() {
        let config: Config = toml::from_str(
            "[tui]\ndark = false\n\n[speech]\nrate = 120\n\n[wiki]\nbase_url = \"https://de.wikipedia.org/wiki\"\n",
        )
        .expect("parse failed");
        assert!(!config.tui.dark);
        assert_eq!(config.tui.tick_ms, 33);
        assert_eq!(config.speech.rate, 120);
        assert_eq!(config.speech.command, "espeak");
        assert_eq!(config.speech.voice, "en");
        assert_eq!(config.wiki.base_url, "https://de.wikipedia.org/wiki");
        assert_eq!(
            config.wiki.summary_url,
            "https://en.wikipedia.org/api/rest_v1/page/summary"
        );
    }

    #[test]
    fn empty_petal_section_keeps_version() {
        let config: Config = toml::from_str("[petal]\n").expect("parse failed");
        assert_eq!(config.petal.version, "0.1.0");
    }

    #[test]
    fn default_speech_matches_readout_rate() {
        let config = Config::default();
        assert_eq!(config.speech.command, "espeak");
        assert_eq!(config.speech.rate, 150);
        assert_eq!(config.wiki.base_url, "https://en.wikipedia.org/wiki");
    }
}
