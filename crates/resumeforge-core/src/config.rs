//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/resumeforge/config.toml)
//! 3. Environment variables (RESUMEFORGE_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "RESUMEFORGE";

/// Storage key of the persisted resume document
pub const RESUME_STORAGE_KEY: &str = "resume-storage.json";

/// Storage key of the persisted device identifier
pub const DEVICE_ID_STORAGE_KEY: &str = "device_id";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory for local storage (resume document, device id)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Root of the ResumeForge HTTP API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Public origin of the web app, used to build the checkout success URL
    #[serde(default = "default_app_url")]
    pub app_url: String,

    /// Output language requested from the generator
    #[serde(default = "default_language")]
    pub language: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Log file path (defaults to {data_dir}/debug.log when logging is enabled)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_url: default_api_url(),
            app_url: default_app_url(),
            language: default_language(),
            request_timeout_secs: default_request_timeout(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (RESUMEFORGE_DATA_DIR, RESUMEFORGE_API_URL, ...)
    /// 2. Config file (~/.config/resumeforge/config.toml or RESUMEFORGE_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_APP_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.app_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_LANGUAGE", ENV_PREFIX)) {
            if !val.is_empty() {
                self.language = val;
            }
        }

        // Unparseable values are ignored
        if let Ok(val) = std::env::var(format!("{}_REQUEST_TIMEOUT", ENV_PREFIX)) {
            if let Ok(secs) = val.parse() {
                self.request_timeout_secs = secs;
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with RESUMEFORGE_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("resumeforge")
            .join("config.toml")
    }

    /// URL the payment provider redirects to after a completed checkout
    ///
    /// `{CHECKOUT_SESSION_ID}` is left in place for the provider to fill.
    pub fn checkout_success_url(&self) -> String {
        format!(
            "{}/payment/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.app_url.trim_end_matches('/')
        )
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("resumeforge")
}

fn default_api_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_app_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "RESUMEFORGE_DATA_DIR",
        "RESUMEFORGE_API_URL",
        "RESUMEFORGE_APP_URL",
        "RESUMEFORGE_LANGUAGE",
        "RESUMEFORGE_REQUEST_TIMEOUT",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000/api/v1");
        assert_eq!(config.language, "en");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("resumeforge"));
    }

    #[test]
    fn test_checkout_success_url() {
        let mut config = Config::default();
        config.app_url = "https://resume.example.com/".to_string();

        assert_eq!(
            config.checkout_success_url(),
            "https://resume.example.com/payment/success?session_id={CHECKOUT_SESSION_ID}"
        );
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("RESUMEFORGE_DATA_DIR", "/tmp/resumeforge-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/resumeforge-test"));
    }

    #[test]
    fn test_env_override_api_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("RESUMEFORGE_API_URL", "https://api.example.com/api/v1");
        config.apply_env_overrides();
        assert_eq!(config.api_url, "https://api.example.com/api/v1");

        // Empty string keeps the current value
        env::set_var("RESUMEFORGE_API_URL", "");
        config.apply_env_overrides();
        assert_eq!(config.api_url, "https://api.example.com/api/v1");
    }

    #[test]
    fn test_env_override_timeout() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("RESUMEFORGE_REQUEST_TIMEOUT", "5");
        config.apply_env_overrides();
        assert_eq!(config.request_timeout_secs, 5);

        env::set_var("RESUMEFORGE_REQUEST_TIMEOUT", "soon");
        config.apply_env_overrides();
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/resumeforge"),
            api_url: "https://api.example.com/api/v1".to_string(),
            app_url: "https://resume.example.com".to_string(),
            language: "de".to_string(),
            request_timeout_secs: 10,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("api_url"));
        assert!(toml_str.contains("language"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            api_url = "https://example.com/api/v1"
            language = "fr"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.api_url, "https://example.com/api/v1");
        assert_eq!(config.language, "fr");
        // Unspecified keys fall back to defaults
        assert_eq!(config.app_url, "http://localhost:5173");
    }

    #[test]
    fn test_env_beats_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("RESUMEFORGE_LANGUAGE", "es");
        let config = Config::load_from_str(r#"language = "fr""#).unwrap();
        assert_eq!(config.language, "es");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("RESUMEFORGE_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.language, "en");
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.data_dir = temp_dir.path().join("data");
        config.language = "it".to_string();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.language, "it");
        assert_eq!(loaded.data_dir, config.data_dir);
    }
}
