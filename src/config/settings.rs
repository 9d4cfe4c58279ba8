//! Configuration settings for Deskhand.

use crate::error::{DeskhandError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub agent: AgentSettings,
    pub database: DatabaseSettings,
    pub automation: AutomationSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// The single front-end origin allowed to call the API with credentials.
    pub allowed_origin: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origin: "http://localhost:3000".to_string(),
        }
    }
}

/// Agent runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Model used when a request does not name one.
    pub default_model: String,
    /// Base URL of the OpenAI-compatible endpoint.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Maximum model round trips per instruction.
    pub max_iterations: usize,
    /// HTTP timeout for a single model call, in seconds.
    pub timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            default_model: "openai/gpt-5".to_string(),
            api_base: "https://api.dedaluslabs.ai/v1".to_string(),
            api_key_env: "DEDALUS_API_KEY".to_string(),
            max_iterations: 10,
            timeout_secs: 300,
        }
    }
}

/// Database settings for the SQL tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file.
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "./data/conversations.db".to_string(),
        }
    }
}

/// OS automation settings for the reminder and calendar tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    /// The `osascript` binary.
    pub osascript: String,
    /// Reminders list that new reminders land in.
    pub reminders_list: String,
    /// Calendar used when the agent does not name one.
    pub default_calendar: String,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            osascript: "osascript".to_string(),
            reminders_list: "Reminders".to_string(),
            default_calendar: "Calendar".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Check values that would otherwise fail late, at bind or request time.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(DeskhandError::Config("server.port must be non-zero".to_string()));
        }

        let origin = url::Url::parse(&self.server.allowed_origin).map_err(|e| {
            DeskhandError::Config(format!(
                "server.allowed_origin '{}' is not a valid URL: {}",
                self.server.allowed_origin, e
            ))
        })?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(DeskhandError::Config(format!(
                "server.allowed_origin must be http or https, got '{}'",
                origin.scheme()
            )));
        }

        if self.agent.max_iterations == 0 {
            return Err(DeskhandError::Config(
                "agent.max_iterations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// The allowed origin as browsers send it (`scheme://host[:port]`).
    pub fn cors_origin(&self) -> Result<String> {
        let origin = url::Url::parse(&self.server.allowed_origin)
            .map_err(|e| DeskhandError::Config(e.to_string()))?;
        Ok(origin.origin().ascii_serialization())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deskhand")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded SQLite database path.
    pub fn database_path(&self) -> PathBuf {
        Self::expand_path(&self.database.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.agent.default_model, "openai/gpt-5");
        assert_eq!(settings.automation.default_calendar, "Calendar");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [server]
            port = 9100

            [database]
            path = "/tmp/other.db"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/other.db"));
        assert_eq!(settings.agent.max_iterations, 10);
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let mut settings = Settings::default();
        settings.server.allowed_origin = "localhost:3000".to_string();
        assert!(settings.validate().is_err());

        settings.server.allowed_origin = "not a url".to_string();
        assert!(matches!(settings.validate(), Err(DeskhandError::Config(_))));
    }

    #[test]
    fn test_cors_origin_drops_trailing_slash() {
        let mut settings = Settings::default();
        settings.server.allowed_origin = "http://localhost:3000/".to_string();
        assert_eq!(settings.cors_origin().unwrap(), "http://localhost:3000");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.server.port, 8000);
    }
}
