//! Store configuration loaded from TOML
//!
//! ```toml
//! data_dir = "/home/me/.currency-rates"
//! db_file = "rates.db"
//! in_memory = false
//! ```

use crate::currency::CurrencyRegistry;
use crate::error::{RatesError, Result};
use crate::store::{RatesDB, StoreLocation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const APP_DIR: &str = ".currency-rates";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_db_file")]
    pub db_file: String,
    /// Keep rates in a transient table instead of `data_dir/db_file`
    #[serde(default)]
    pub in_memory: bool,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn default_db_file() -> String {
    "rates.db".to_string()
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_file: default_db_file(),
            in_memory: false,
        }
    }
}

impl RatesConfig {
    /// `~/.currency-rates/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| RatesError::ConfigError(e.to_string()))
    }

    /// Load `path`, or the default config file when `path` is `None`
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is
    /// logged and also yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) if path.exists() => path,
            _ => return Self::default(),
        };

        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn location(&self) -> StoreLocation {
        if self.in_memory {
            StoreLocation::Memory
        } else {
            StoreLocation::File(self.db_path())
        }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        if !self.in_memory {
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }

    /// Create the data directory and open the configured store
    pub fn open_store(&self, registry: Arc<CurrencyRegistry>) -> Result<RatesDB> {
        if let Err(e) = self.ensure_dirs() {
            log::warn!(
                "Can't create data directory {}: {}",
                self.data_dir.display(),
                e
            );
        }
        RatesDB::open(self.location(), registry)
    }
}
