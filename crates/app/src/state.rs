use std::{fs, path::PathBuf};

use serde::Deserialize;

use crate::args::Format;

pub const APP_NAME: &str = "zkcli";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Settings read from `config.toml`; every field can be overridden on the
/// command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `host[:port]` entries, tried in order
    pub servers: Vec<String>,
    pub auth_user: Option<String>,
    pub auth_pwd: Option<String>,
    /// Same meaning as `--acls`
    pub acls: Option<String>,
    pub format: Option<Format>,
    pub session_timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub operation_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration, or the defaults when no file exists
    pub config: AppConfig,
}

impl AppState {
    /// Get the zkcli directory path (custom or default ~/.zkcli)
    pub fn zkcli_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Load the config file. A missing file is not an error.
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let config_path = Self::zkcli_dir(custom_path)?.join(CONFIG_FILE_NAME);

        let config = if config_path.exists() {
            let config_toml = fs::read_to_string(&config_path)?;
            toml::from_str(&config_toml)?
        } else {
            tracing::debug!("no config at {}, using defaults", config_path.display());
            AppConfig::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no home directory found")]
    NoHomeDirectory,

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
    fn test_load_without_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let state = AppState::load(Some(temp.path().join("missing"))).unwrap();
        assert_eq!(state.config, AppConfig::default());
    }

    #[test]
    fn test_load_full_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            r#"
servers = ["zk1:2181", "zk2"]
auth_user = "ops"
auth_pwd = "hunter2"
acls = "31,1"
format = "json"
operation_timeout_ms = 2500
"#,
        )
        .unwrap();

        let state = AppState::load(Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(state.config_path, temp.path().join(CONFIG_FILE_NAME));
        assert_eq!(
            state.config,
            AppConfig {
                servers: vec!["zk1:2181".to_string(), "zk2".to_string()],
                auth_user: Some("ops".to_string()),
                auth_pwd: Some("hunter2".to_string()),
                acls: Some("31,1".to_string()),
                format: Some(Format::Json),
                operation_timeout_ms: Some(2500),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_partial_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "servers = [\"a:1\"]\nacls = \"world:anyone:r\"\n",
        )
        .unwrap();

        let state = AppState::load(Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(state.config.servers, vec!["a:1"]);
        assert_eq!(state.config.acls.as_deref(), Some("world:anyone:r"));
        assert_eq!(state.config.format, None);
    }

    #[test]
    fn test_malformed_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "servers = 3").unwrap();
        assert!(matches!(
            AppState::load(Some(temp.path().to_path_buf())),
            Err(StateError::TomlDe(_))
        ));
    }
}
