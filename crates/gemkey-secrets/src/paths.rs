//! Filesystem layout of the credential store. Pure path arithmetic, no I/O.

use std::path::{Path, PathBuf};

use gemkey_core::{GemkeyError, GemkeyResult, APP_DIR_NAME};

const ENCRYPTED_FILE: &str = "api_key.enc";
const LEGACY_PLAIN_FILE: &str = "api_key.txt";
const TEMP_SUFFIX: &str = ".tmp";

/// Resolved paths under `<user_config_dir>/gemini-gtk/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    app_dir: PathBuf,
}

impl StorePaths {
    /// Resolve against the platform configuration directory
    /// (`$XDG_CONFIG_HOME` or `~/.config` on Linux).
    pub fn discover() -> GemkeyResult<Self> {
        dirs::config_dir()
            .map(|root| Self::from_config_root(&root))
            .ok_or(GemkeyError::ConfigRootMissing)
    }

    /// Use `root` in place of the user configuration directory.
    pub fn from_config_root(root: &Path) -> Self {
        Self {
            app_dir: root.join(APP_DIR_NAME),
        }
    }

    /// `from_config_root(root)` when an override is configured, else `discover()`.
    pub fn resolve(config_root: Option<&Path>) -> GemkeyResult<Self> {
        match config_root {
            Some(root) => Ok(Self::from_config_root(root)),
            None => Self::discover(),
        }
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn encrypted_path(&self) -> PathBuf {
        self.app_dir.join(ENCRYPTED_FILE)
    }

    pub fn legacy_plain_path(&self) -> PathBuf {
        self.app_dir.join(LEGACY_PLAIN_FILE)
    }

    /// Sibling of the container used for write-then-rename.
    pub fn temp_path(&self) -> PathBuf {
        self.app_dir.join(format!("{ENCRYPTED_FILE}{TEMP_SUFFIX}"))
    }
}
