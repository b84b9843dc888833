use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GemkeyError, GemkeyResult};
use crate::APP_DIR_NAME;

/// File name of the optional configuration file inside the app directory.
pub const CONFIG_FILE_NAME: &str = "gemkey.toml";

/// Top-level configuration (loaded from gemkey.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GemkeyConfig {
    pub store: StoreConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Replaces the platform user configuration directory as the root under
    /// which `gemini-gtk/` lives. Unset means XDG / platform default.
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl GemkeyConfig {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> GemkeyResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(GemkeyError::Config(format!(
                    "reading {}: {e}",
                    path.display()
                )))
            }
        };
        toml::from_str(&content)
            .map_err(|e| GemkeyError::Config(format!("parsing {}: {e}", path.display())))
    }
}

/// Default location of gemkey.toml: `<user_config_dir>/gemini-gtk/gemkey.toml`.
pub fn default_config_path() -> GemkeyResult<PathBuf> {
    dirs::config_dir()
        .map(|root| root.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(GemkeyError::ConfigRootMissing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[store]
config_dir = "/home/user/.config-alt"

[log]
level = "debug"
format = "json"
"#;
        let config: GemkeyConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(
            config.store.config_dir,
            Some(PathBuf::from("/home/user/.config-alt"))
        );
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "json");
    }

    #[test]
    fn test_parse_defaults() {
        let config: GemkeyConfig = toml::from_str("").unwrap();

        assert!(config.store.config_dir.is_none());
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.format, "text");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[log]
level = "trace"
"#;
        let config: GemkeyConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.log.level, "trace");
        // Defaults
        assert_eq!(config.log.format, "text");
        assert!(config.store.config_dir.is_none());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GemkeyConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[log\nlevel = ").unwrap();

        let err = GemkeyConfig::load(&path).unwrap_err();
        assert!(matches!(err, GemkeyError::Config(_)));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut config = GemkeyConfig::default();
        config.store.config_dir = Some(PathBuf::from("/tmp/gemkey-root"));
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: GemkeyConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.store.config_dir, parsed.store.config_dir);
        assert_eq!(config.log.level, parsed.log.level);
    }
}
