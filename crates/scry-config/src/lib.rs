use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub capture: CaptureConfig,
    pub input: InputConfig,
}

/// Text recognition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Name or path of the tesseract binary
    pub binary: String,

    /// Recognition languages, in tesseract notation (e.g. "rus+eng")
    pub language: String,

    /// Minimum token confidence for text location, 0.0 to 1.0
    pub confidence_threshold: f32,
}

/// Screen capture settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Directory screenshots and analyses are written to
    pub screenshots_dir: String,

    /// Directory per-window element maps are cached in
    pub interface_cache_dir: String,

    /// Keep a copy of every captured frame on disk
    pub persist_screenshots: bool,
}

/// Input injection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pause between simulated key presses, in seconds
    pub type_interval: f64,

    /// Pause between a focusing click and the typing after it, in seconds
    pub focus_delay: f64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "rus+eng".to_string(),
            confidence_threshold: 0.7,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            screenshots_dir: "screenshots".to_string(),
            interface_cache_dir: "interface_cache".to_string(),
            persist_screenshots: true,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            type_interval: 0.05,
            focus_delay: 0.5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            capture: CaptureConfig::default(),
            input: InputConfig::default(),
        }
    }
}

const DEFAULT_PATHS: [&str; 3] = ["./scry.toml", "~/.config/scry/config.toml", "~/.scry.toml"];

/// Upper bound for the typing interval and focus delay, in seconds.
const MAX_DELAY_SECS: f64 = 3600.0;

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Check if any config file exists
        let config_exists = if let Some(path) = config_path {
            Path::new(path).exists()
        } else {
            DEFAULT_PATHS.iter().any(|path| {
                let expanded_path = shellexpand::tilde(path);
                Path::new(expanded_path.as_ref()).exists()
            })
        };

        // If no config exists, create and save a default config
        if !config_exists {
            let default_config = Self::default();

            let config_dir = dirs::home_dir()
                .map(|mut path| {
                    path.push(".config");
                    path.push("scry");
                    path
                })
                .unwrap_or_else(|| std::path::PathBuf::from("."));

            std::fs::create_dir_all(&config_dir).ok();

            let config_file = config_dir.join("config.toml");
            if let Err(e) = default_config.save(&config_file) {
                eprintln!("Warning: Could not save default config: {}", e);
            } else {
                println!(
                    "Created default configuration at: {}",
                    config_file.display()
                );
            }

            return Ok(default_config);
        }

        // Load config from file
        let config_path_to_load = if let Some(path) = config_path {
            Some(path.to_string())
        } else {
            DEFAULT_PATHS.iter().find_map(|path| {
                let expanded_path = shellexpand::tilde(path);
                if Path::new(expanded_path.as_ref()).exists() {
                    Some(expanded_path.to_string())
                } else {
                    None
                }
            })
        };

        if let Some(path) = config_path_to_load {
            let config_content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&config_content)?;
            config.validate()?;
            return Ok(config);
        }

        Ok(Self::default())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn load_with_overrides(
        config_path: Option<&str>,
        language_override: Option<String>,
        threshold_override: Option<f32>,
    ) -> Result<Self> {
        let mut config = Self::load(config_path)?;

        if let Some(language) = language_override {
            config.ocr.language = language;
        }

        if let Some(threshold) = threshold_override {
            config.ocr.confidence_threshold = threshold;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.ocr.confidence_threshold) {
            anyhow::bail!(
                "OCR confidence threshold must be between 0.0 and 1.0, got {}",
                self.ocr.confidence_threshold
            );
        }
        if self.ocr.binary.is_empty() {
            anyhow::bail!("OCR binary must not be empty");
        }
        if self.ocr.language.is_empty() {
            anyhow::bail!("OCR language must not be empty");
        }
        // TOML accepts nan and inf; the range check rejects both.
        if !(0.0..=MAX_DELAY_SECS).contains(&self.input.type_interval) {
            anyhow::bail!(
                "Type interval must be between 0 and {MAX_DELAY_SECS} seconds, got {}",
                self.input.type_interval
            );
        }
        if !(0.0..=MAX_DELAY_SECS).contains(&self.input.focus_delay) {
            anyhow::bail!(
                "Focus delay must be between 0 and {MAX_DELAY_SECS} seconds, got {}",
                self.input.focus_delay
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
