use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};

/// Name of the per-user database directory used by
/// [`GentleDbConfig::default_location`].
pub const DEFAULT_DIR_NAME: &str = ".gentledb";

/// Which storage substrate backs a database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Durable store rooted at `base_dir`, created if missing.
    Filesystem {
        base_dir: PathBuf,
        #[serde(default = "default_sync_writes")]
        sync_writes: bool,
    },
    /// Volatile store; always empty on open.
    Memory,
}

fn default_sync_writes() -> bool {
    true
}

/// Construction parameters for [`crate::GentleDb`].
///
/// ```toml
/// [storage]
/// backend = "filesystem"
/// base_dir = "/var/lib/gentledb"
/// sync_writes = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GentleDbConfig {
    pub storage: BackendConfig,
}

impl Default for GentleDbConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl GentleDbConfig {
    pub fn in_memory() -> Self {
        Self {
            storage: BackendConfig::Memory,
        }
    }

    pub fn durable(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage: BackendConfig::Filesystem {
                base_dir: base_dir.into(),
                sync_writes: default_sync_writes(),
            },
        }
    }

    /// `$HOME/.gentledb`, or `None` if `HOME` is unset.
    pub fn default_location() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_DIR_NAME))
    }

    pub fn from_toml_str(s: &str) -> DbResult<Self> {
        toml::from_str(s).map_err(|e| DbError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> DbResult<String> {
        toml::to_string(self).map_err(|e| DbError::Config(e.to_string()))
    }

    /// Read a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
