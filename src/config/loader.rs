//! Configuration Loader
//!
//! Loads transport settings from the client configuration files. Files are
//! JSON objects; keys from later files override earlier ones.

use crate::config::settings::TransportSettings;
use crate::error::{Result, TransportError};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "NS1_CONFIG_PATH";

/// Configuration loader with support for multiple sources
pub struct ConfigLoader {
    values: Map<String, Value>,
    settings: TransportSettings,
}

impl ConfigLoader {
    /// Create a loader and read every default location that exists
    pub fn new() -> Result<Self> {
        // Load .env file if present so CONFIG_PATH_ENV can come from it
        let _ = dotenvy::dotenv();

        let mut loader = Self::empty();
        loader.load_from_default_paths()?;
        loader.finish()?;
        Ok(loader)
    }

    /// Create a loader with a specific config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self::empty();
        loader.load_from_file(path)?;
        loader.finish()?;
        Ok(loader)
    }

    fn empty() -> Self {
        Self {
            values: Map::new(),
            settings: TransportSettings::default(),
        }
    }

    /// Load configuration from default paths
    fn load_from_default_paths(&mut self) -> Result<()> {
        for path in Self::get_config_paths() {
            if path.exists() {
                self.load_from_file(&path)?;
            }
        }
        Ok(())
    }

    /// Config paths, least specific first
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".nsone"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("ns1").join("config.json"));
        }

        paths.push(PathBuf::from(".nsone"));

        if let Ok(custom_path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(custom_path));
        }

        paths
    }

    /// Load configuration from a specific file
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TransportError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let value: Value = serde_json::from_str(&content).map_err(|e| {
            TransportError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        match value {
            Value::Object(map) => {
                debug!(path = %path.display(), keys = map.len(), "loaded config file");
                self.merge(map);
                Ok(())
            }
            _ => Err(TransportError::Config(format!(
                "{} must contain a JSON object",
                path.display()
            ))),
        }
    }

    fn merge(&mut self, other: Map<String, Value>) {
        for (key, value) in other {
            self.values.insert(key, value);
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.settings = serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|e| TransportError::Config(format!("Invalid transport settings: {}", e)))?;
        Ok(())
    }

    /// Get the loaded settings
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Raw value of any key, including ones the transport does not use
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Take ownership of the settings
    pub fn into_settings(self) -> TransportSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Timeout;
    use crate::transport::rate_limiter::RateLimitStrategy;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_from_custom_file() {
        let file = write_config(
            r#"{
                "transport": "requests",
                "verify": false,
                "timeout": [5, 30],
                "rate_limit_strategy": "concurrent",
                "parallelism": 4,
                "endpoint": "api.nsone.net"
            }"#,
        );

        let loader = ConfigLoader::from_path(file.path()).unwrap();
        let settings = loader.settings();

        assert!(!settings.verify_tls());
        assert_eq!(
            settings.timeout().unwrap(),
            Timeout::ConnectRead(Duration::from_secs(5), Duration::from_secs(30))
        );
        assert_eq!(settings.rate_limit_strategy, RateLimitStrategy::Concurrent);
        assert_eq!(settings.parallelism, 4);
        assert_eq!(loader.get("endpoint"), Some(&Value::from("api.nsone.net")));
    }

    #[test]
    fn test_merge_configs() {
        let base = write_config(r#"{"verify": false, "parallelism": 2}"#);
        let overlay = write_config(r#"{"parallelism": 8}"#);

        let mut loader = ConfigLoader::empty();
        loader.load_from_file(base.path()).unwrap();
        loader.load_from_file(overlay.path()).unwrap();
        loader.finish().unwrap();

        assert!(!loader.settings().verify);
        assert_eq!(loader.settings().parallelism, 8);
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::from_path("/nonexistent/ns1/config.json");
        assert!(matches!(result, Err(TransportError::Config(msg)) if msg.contains("Failed to read")));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ not json");
        let result = ConfigLoader::from_path(file.path());
        assert!(matches!(result, Err(TransportError::Config(msg)) if msg.contains("Failed to parse")));
    }

    #[test]
    fn test_non_object_rejected() {
        let file = write_config("[1, 2, 3]");
        assert!(ConfigLoader::from_path(file.path()).is_err());
    }

    #[test]
    fn test_invalid_field_type() {
        let file = write_config(r#"{"verify": "yes"}"#);
        let result = ConfigLoader::from_path(file.path());
        assert!(matches!(result, Err(TransportError::Config(msg)) if msg.contains("Invalid transport settings")));
    }
}
