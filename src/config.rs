use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::storage::DatabaseOptions;

/// 进程级配置（TOML）
///
/// ```toml
/// db_path = "/var/lib/chirpy/database.json"
/// sync = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub sync: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            sync: true,
        }
    }
}

/// `<data_dir>/chirpy/database.json`，无 data_dir 时退回当前目录
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("chirpy").join("database.json"))
        .unwrap_or_else(|| PathBuf::from("database.json"))
}

impl StoreConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions { sync: self.sync }
    }
}
