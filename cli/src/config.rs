use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve where collections are stored. `db_override` replaces the default
    /// `<data dir>/recipehub.db`; its directory must already exist.
    pub fn load(db_override: Option<&Path>) -> Result<Self> {
        if let Some(path) = db_override {
            return Ok(Config {
                db_path: path.to_path_buf(),
            });
        }

        let proj_dirs =
            ProjectDirs::from("", "", "recipehub").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("recipehub.db");

        Ok(Config { db_path })
    }
}
