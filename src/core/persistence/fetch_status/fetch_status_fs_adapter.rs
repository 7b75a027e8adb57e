use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::fetch_status_entity::FetchStatusEntity;

/// Stores [`FetchStatusEntity`] as a small JSON file, replaced atomically.
#[derive(Debug, Clone)]
pub struct FetchStatusFsAdapter {
    path: PathBuf,
}

impl FetchStatusFsAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no run has been recorded yet.
    pub fn read(&self) -> Result<Option<FetchStatusEntity>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path).context("Failed to read fetch status file")?;
        let status = serde_json::from_str(&raw).context("Failed to parse fetch status file")?;
        Ok(Some(status))
    }

    /// Forgets the last recorded run. A missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove fetch status file"),
        }
    }

    pub fn write(&self, data: &FetchStatusEntity) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context("Failed to create fetch status directory")?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let mut f = File::create(&tmp_path).context("Failed to create temp fetch status file")?;
        serde_json::to_writer_pretty(&mut f, data).context("Failed to encode fetch status")?;
        f.write_all(b"\n")?;
        f.flush()?;
        f.sync_all().context("Failed to sync temp fetch status file")?;

        fs::rename(&tmp_path, &self.path).context("Failed to finalize fetch status file")?;
        Ok(())
    }
}
