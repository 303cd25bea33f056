use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::primary::youtube::DEFAULT_BASE_URL;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hosted transcript service settings
    pub primary: PrimaryConfig,

    /// Local download + speech recognition settings
    pub fallback: FallbackConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryConfig {
    /// Base URL of the transcript service
    pub base_url: String,

    /// Caption languages to try, in order of preference
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Fall back to download + transcription when no transcript is available
    pub enabled: bool,

    /// Downloader executable
    pub downloader: String,

    /// Codec the downloaded audio is transcoded to
    pub audio_format: String,

    /// Whisper executable
    pub whisper_command: String,

    /// Whisper model variant
    pub model: String,

    /// Optional spoken language hint for the model
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base directory for per-run workspaces (system temp dir if unset)
    pub work_dir: Option<PathBuf>,

    /// Default output format
    pub default_output_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            primary: PrimaryConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                languages: vec!["en".to_string()],
            },
            fallback: FallbackConfig {
                enabled: true,
                downloader: "yt-dlp".to_string(),
                audio_format: "mp3".to_string(),
                whisper_command: "whisper".to_string(),
                model: "base".to_string(),
                language: None,
            },
            app: AppConfig {
                work_dir: None,
                default_output_format: "text".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            Self::from_yaml(&content)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("vidscribe").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.primary.languages.is_empty() {
            anyhow::bail!("At least one transcript language must be configured");
        }

        url::Url::parse(&self.primary.base_url)
            .with_context(|| format!("Invalid transcript service URL: {}", self.primary.base_url))?;

        if self.fallback.downloader.trim().is_empty() {
            anyhow::bail!("Fallback downloader command must not be empty");
        }

        if self.fallback.whisper_command.trim().is_empty() {
            anyhow::bail!("Whisper command must not be empty");
        }

        if self.fallback.audio_format.trim().is_empty() {
            anyhow::bail!("Fallback audio format must not be empty");
        }

        self.app
            .default_output_format
            .parse::<OutputFormat>()
            .context("Invalid default_output_format")?;

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Transcript Service: {}", self.primary.base_url);
        println!("  Languages: {}", self.primary.languages.join(", "));
        println!("  Fallback Enabled: {}", self.fallback.enabled);
        println!("  Downloader: {}", self.fallback.downloader);
        println!("  Audio Format: {}", self.fallback.audio_format);
        println!("  Whisper: {} (model: {})", self.fallback.whisper_command, self.fallback.model);
        if let Some(language) = &self.fallback.language {
            println!("  Spoken Language: {}", language);
        }
        if let Some(work_dir) = &self.app.work_dir {
            println!("  Work Dir: {}", work_dir.display());
        }
        println!("  Default Format: {}", self.app.default_output_format);
    }
}
