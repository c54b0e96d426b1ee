// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{RelayError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Conventional variable holding the provider key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. CLI arguments (highest, applied by the caller)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(&Self::default_config_path()))
    }

    /// Same as [`AppConfig::load`] with an explicit config file location.
    /// A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::build(path, Some(Self::env_source()))?;
        config.resolve_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    fn build(path: &Path, env: Option<Environment>) -> Result<Self> {
        let mut builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::from(path).required(false));

        // Override with environment variables (e.g. GEMINI_RELAY__SERVER__PORT)
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        builder
            .build()
            .map_err(|e| RelayError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| RelayError::Config(e.to_string()))
    }

    fn env_source() -> Environment {
        Environment::with_prefix("GEMINI_RELAY")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    /// Fill in the API key from `GEMINI_API_KEY` when the layered sources
    /// did not provide one. Blank keys count as missing.
    pub fn resolve_api_key(&mut self, env_value: Option<String>) {
        if self.gemini.api_key.as_ref().is_some_and(ApiKey::is_blank) {
            warn!("Configured Gemini API key is blank; ignoring it");
            self.gemini.api_key = None;
        }

        if self.gemini.api_key.is_none() {
            self.gemini.api_key = env_value
                .map(ApiKey::new)
                .filter(|key| !key.is_blank());
        }
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gemini-relay")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config =
            AppConfig::build(Path::new("/nonexistent/gemini-relay.toml"), None).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cors.allow_origin, "*");
        assert_eq!(
            config.gemini.api_base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[gemini]
api_key = "from-file"
timeout_seconds = 30

[cors]
allow_origin = "https://chat.example.com"
"#
        )
        .unwrap();

        let config = AppConfig::build(file.path(), None).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.gemini.timeout_seconds, 30);
        assert_eq!(config.cors.allow_origin, "https://chat.example.com");
        assert_eq!(config.gemini.api_key.unwrap().expose(), "from-file");
    }

    #[test]
    fn test_env_key_fills_missing_key() {
        let mut config = AppConfig::default();
        config.resolve_api_key(Some("from-env".to_string()));
        assert_eq!(config.gemini.api_key.unwrap().expose(), "from-env");
    }

    #[test]
    fn test_configured_key_wins_over_env() {
        let mut config = AppConfig::default();
        config.gemini.api_key = Some(ApiKey::new("configured"));
        config.resolve_api_key(Some("from-env".to_string()));
        assert_eq!(config.gemini.api_key.unwrap().expose(), "configured");
    }

    #[test]
    fn test_blank_keys_are_missing() {
        let mut config = AppConfig::default();
        config.gemini.api_key = Some(ApiKey::new(""));
        config.resolve_api_key(Some("  ".to_string()));
        assert!(config.gemini.api_key.is_none());
    }
}
