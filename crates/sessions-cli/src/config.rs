//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use sessions_core::SessionConfig;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the activities service.
    pub api_url: Option<String>,

    /// Value sent in the `Authorization` header.
    pub api_key: Option<String>,

    /// Largest gap, in seconds, that keeps two activities in one session.
    pub gap_threshold_secs: u32,

    /// Fail on activities answered before they were first seen.
    pub strict_timestamps: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("gap_threshold_secs", &self.gap_threshold_secs)
            .field("strict_timestamps", &self.strict_timestamps)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            api_url: None,
            api_key: None,
            gap_threshold_secs: session.gap_threshold_secs,
            strict_timestamps: session.strict_timestamps,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SESSIONS_*)
        figment = figment.merge(Env::prefixed("SESSIONS_"));

        figment.extract()
    }

    /// Segmentation settings from this configuration.
    pub const fn session_config(&self) -> SessionConfig {
        SessionConfig {
            gap_threshold_secs: self.gap_threshold_secs,
            strict_timestamps: self.strict_timestamps,
        }
    }
}

/// Returns the platform-specific config directory for sessions.
///
/// On Linux: `~/.config/sessions`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sessions"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_dirs_config_path_ends_with_sessions() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "sessions");
    }

    #[test]
    fn test_default_config_uses_five_minute_gap() {
        let config = Config::default();
        assert_eq!(config.gap_threshold_secs, 300);
        assert!(!config.strict_timestamps);
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_url = "https://api.example.com"
gap_threshold_secs = 120
strict_timestamps = true
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.gap_threshold_secs, 120);
        assert_eq!(
            config.session_config(),
            SessionConfig {
                gap_threshold_secs: 120,
                strict_timestamps: true,
            }
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config {
            api_key: Some("secret-key".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
