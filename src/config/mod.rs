use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_server_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_categories() -> Vec<String> {
    ["general", "politics", "sports", "technology", "business", "entertainment"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_languages() -> Vec<String> {
    ["hi", "mr", "es", "fr"].iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the news server (the app POSTs to `{server_url}/get_news`)
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Categories offered by the query form
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Category preselected on startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_category: Option<String>,

    /// Translation target languages offered by the query form
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Language preselected on startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,

    /// Start with the translation toggle on
    #[serde(default)]
    pub translate_by_default: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            categories: default_categories(),
            default_category: None,
            languages: default_languages(),
            default_language: None,
            translate_by_default: false,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("khabar");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Drop blank entries before saving; an empty selection list would
        // leave the form with nothing to cycle through.
        let mut clean_config = self.clone();
        clean_config.categories.retain(|c| !c.trim().is_empty());
        clean_config.languages.retain(|l| !l.trim().is_empty());
        if clean_config.categories.is_empty() {
            clean_config.categories = default_categories();
        }
        if clean_config.languages.is_empty() {
            clean_config.languages = default_languages();
        }

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            server_url: "http://news.local:9000".to_string(),
            categories: vec!["politics".to_string(), "sports".to_string()],
            default_category: Some("sports".to_string()),
            languages: vec!["hi".to_string(), "es".to_string()],
            default_language: Some("hi".to_string()),
            translate_by_default: true,
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.server_url, deserialized.server_url);
        assert_eq!(config.categories, deserialized.categories);
        assert_eq!(config.default_language, deserialized.default_language);
        assert!(deserialized.translate_by_default);
    }

    #[test]
    fn test_empty_file_gets_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:8000");
        assert_eq!(config.categories.len(), 6);
        assert_eq!(config.languages, vec!["hi", "mr", "es", "fr"]);
        assert!(!config.translate_by_default);
    }
}
