use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::ledger::LedgerLayout;
use crate::model::mapping::ActivityMapping;

const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_LEDGER_FILE_NAME: &str = "ledger.json";

/// `~/.sheetpush`
pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(".sheetpush"))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub ledger_path: PathBuf,
    #[serde(default)]
    pub layout: LedgerLayout,
    /// JSON list of projects. The built-in table is used when unset.
    #[serde(default)]
    pub mapping_path: Option<PathBuf>,
}

impl Config {
    pub fn with_defaults(data_dir: &Path) -> Self {
        Self {
            ledger_path: data_dir.join(DEFAULT_LEDGER_FILE_NAME),
            layout: LedgerLayout::default(),
            mapping_path: None,
        }
    }

    /// Loads `config.json` from `base_dir` (default `~/.sheetpush`), writing a default one
    /// first if there is none.
    pub fn load(base_dir: Option<PathBuf>) -> Result<Self> {
        let dir = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&dir)?;
        let path = dir.join(CONFIG_FILE_NAME);

        if !path.exists() {
            let config = Self::with_defaults(&dir);
            let mut writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut writer, &config)?;
            writer.flush()?;
            debug!(path = %path.display(), "wrote default config");
            return Ok(config);
        }

        let reader = BufReader::new(File::open(&path)?);
        let config = serde_json::from_reader(reader)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn activity_mapping(&self) -> Result<ActivityMapping> {
        match &self.mapping_path {
            Some(path) => ActivityMapping::from_json_file(path),
            None => Ok(ActivityMapping::builtin()),
        }
    }
}
