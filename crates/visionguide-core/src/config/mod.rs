//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::OPENAI_BASE_URL;
use crate::image::{ImageModel, ImageQuality, ImageSize, ImageStyle, VisionModel};

/// Environment variable holding the OpenAI credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "VISIONGUIDE_CONFIG_DIR";

/// visionguide configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub defaults: NodeDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_url: String,
    /// 0 disables the client-side timeout
    pub timeout_secs: u64,
}

/// Defaults used when a node input is left unset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDefaults {
    pub image_model: ImageModel,
    pub vision_model: VisionModel,
    pub size: ImageSize,
    pub quality: ImageQuality,
    pub style: ImageStyle,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: OPENAI_BASE_URL.to_string(),
            timeout_secs: 0,
        }
    }
}

impl ApiConfig {
    /// Client timeout, if one is configured
    pub fn timeout(&self) -> Option<u64> {
        (self.timeout_secs > 0).then_some(self.timeout_secs)
    }

    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty()))
    }

    pub fn redacted_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolved_api_key().map(|opt| opt.map(|key| redact(&key)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "OpenAI API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }
}

fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        "***".to_string()
    } else {
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("***{}", suffix)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("visionguide")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or the defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.api.enforce_env_only()?;
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(anyhow!(
                "api.base_url must start with http:// or https:// (got {})",
                self.api.base_url
            ));
        }
        let defaults = &self.defaults;
        if defaults.image_model == ImageModel::DallE3
            && !defaults.image_model.supports_size(defaults.size)
        {
            return Err(anyhow!(
                "defaults.size {} is not supported by {}. Valid options: 1024x1024, 1792x1024, 1024x1792",
                defaults.size,
                defaults.image_model
            ));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "api.base_url" => Ok(self.api.base_url.clone()),
            "api.timeout_secs" => Ok(self.api.timeout_secs.to_string()),

            "defaults.image_model" => Ok(self.defaults.image_model.to_string()),
            "defaults.vision_model" => Ok(self.defaults.vision_model.to_string()),
            "defaults.size" => Ok(self.defaults.size.to_string()),
            "defaults.quality" => Ok(self.defaults.quality.to_string()),
            "defaults.style" => Ok(self.defaults.style.to_string()),

            "api.api_key" | "api_key" => match self.api.redacted_api_key()? {
                Some(redacted) => Ok(redacted),
                None => Ok(format!("(not set - use {} env var)", API_KEY_ENV)),
            },

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `visionguide config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "api.base_url" => {
                self.api.base_url = value.trim_end_matches('/').to_string();
            }
            "api.timeout_secs" => {
                self.api.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
            }

            "defaults.image_model" => {
                self.defaults.image_model = ImageModel::parse(value)
                    .ok_or_else(|| anyhow!("Invalid image model: {}. Valid options: dall-e-3, dall-e-2", value))?;
            }
            "defaults.vision_model" => {
                self.defaults.vision_model = VisionModel::parse(value).ok_or_else(|| {
                    anyhow!("Invalid vision model: {}. Valid options: gpt-4o, gpt-4-turbo", value)
                })?;
            }
            "defaults.size" => {
                self.defaults.size = ImageSize::parse(value).ok_or_else(|| {
                    anyhow!(
                        "Invalid size: {}. Valid options: 1024x1024, 1792x1024, 1024x1792, 512x512, 256x256",
                        value
                    )
                })?;
            }
            "defaults.quality" => {
                self.defaults.quality = ImageQuality::parse(value)
                    .ok_or_else(|| anyhow!("Invalid quality: {}. Valid options: standard, hd", value))?;
            }
            "defaults.style" => {
                self.defaults.style = ImageStyle::parse(value)
                    .ok_or_else(|| anyhow!("Invalid style: {}. Valid options: vivid, natural", value))?;
            }

            // API key cannot be set via config
            "api.api_key" | "api_key" => {
                return Err(anyhow!(
                    "API keys cannot be stored in configuration for security. \
                     Set the {} environment variable instead.",
                    API_KEY_ENV
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `visionguide config list` to see available keys.",
                    key
                ));
            }
        }
        self.validate()
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "api.base_url",
            "api.timeout_secs",
            "api.api_key",
            "defaults.image_model",
            "defaults.vision_model",
            "defaults.size",
            "defaults.quality",
            "defaults.style",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
