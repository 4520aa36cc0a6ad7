use std::{fs, path::PathBuf};

use common::crypto::{AuthKey, AuthKeyError};
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

pub const APP_NAME: &str = "ssb";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Key file, relative to the ssb directory unless absolute
    #[serde(default = "default_keyfile")]
    pub keyfile: PathBuf,
    /// Base64 auxiliary key applied to every sign and verify
    #[serde(default)]
    pub sign_cap: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_keyfile() -> PathBuf {
    PathBuf::from(common::identity::KEY_FILE_NAME)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keyfile: default_keyfile(),
            sign_cap: None,
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the ssb directory (~/.ssb)
    pub ssb_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Path to the identity key file
    pub keys_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the ssb directory path (custom or default ~/.ssb)
    pub fn ssb_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Load state from the ssb directory.
    ///
    /// A missing config file means defaults; `keys_path` overrides the
    /// configured key file.
    pub fn load(
        custom_path: Option<PathBuf>,
        keys_path: Option<PathBuf>,
    ) -> Result<Self, StateError> {
        let ssb_dir = Self::ssb_dir(custom_path)?;
        let config_path = ssb_dir.join(CONFIG_FILE_NAME);

        let config = if config_path.exists() {
            let config_toml = fs::read_to_string(&config_path)?;
            toml::from_str(&config_toml)?
        } else {
            AppConfig::default()
        };

        let keys_path = keys_path.unwrap_or_else(|| ssb_dir.join(&config.keyfile));

        Ok(Self {
            ssb_dir,
            config_path,
            keys_path,
            config,
        })
    }

    /// The configured auxiliary signing key, if any
    pub fn sign_cap(&self) -> Result<Option<AuthKey>, StateError> {
        self.config
            .sign_cap
            .as_deref()
            .map(AuthKey::from_base64)
            .transpose()
            .map_err(StateError::InvalidSignCap)
    }

    /// `explicit` if given, otherwise the configured level
    pub fn log_level(&self, explicit: Option<&str>) -> Result<LevelFilter, StateError> {
        let level = explicit.unwrap_or(&self.config.log_level);
        level
            .parse()
            .map_err(|_| StateError::InvalidLogLevel(level.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("invalid sign_cap: {0}")]
    InvalidSignCap(AuthKeyError),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let state = AppState::load(Some(dir.path().to_path_buf()), None).unwrap();
        assert_eq!(state.config, AppConfig::default());
        assert_eq!(state.keys_path, dir.path().join("secret"));
        assert!(state.sign_cap().unwrap().is_none());
        assert_eq!(state.log_level(None).unwrap(), LevelFilter::WARN);
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "keyfile = \"other\"\nsign_cap = \"AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=\"\nlog_level = \"debug\"\n",
        )
        .unwrap();
        let state = AppState::load(Some(dir.path().to_path_buf()), None).unwrap();
        assert_eq!(state.keys_path, dir.path().join("other"));
        assert!(state.sign_cap().unwrap().is_some());
        assert_eq!(state.log_level(None).unwrap(), LevelFilter::DEBUG);
        assert_eq!(state.log_level(Some("trace")).unwrap(), LevelFilter::TRACE);
    }

    #[test]
    fn test_keys_path_override_and_bad_values() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "sign_cap = \"AAEC\"\nlog_level = \"loud\"\n",
        )
        .unwrap();
        let custom = dir.path().join("elsewhere");
        let state = AppState::load(Some(dir.path().to_path_buf()), Some(custom.clone())).unwrap();
        assert_eq!(state.keys_path, custom);
        assert!(matches!(state.sign_cap(), Err(StateError::InvalidSignCap(_))));
        assert!(matches!(
            state.log_level(None),
            Err(StateError::InvalidLogLevel(level)) if level == "loud"
        ));
    }
}
