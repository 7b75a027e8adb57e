use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::raw_log_fs_adapter_trait::RawLogFsAdapterTrait;
use super::usage_record_entity::UsageRecord;

/// JSON-lines raw log on the local filesystem.
///
/// Every append opens the file, writes one line, flushes and closes it again.
#[derive(Debug, Clone)]
pub struct RawLogFsAdapter {
    path: PathBuf,
}

impl RawLogFsAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create raw log directory {:?}", parent))?;
        }
        Ok(())
    }
}

impl RawLogFsAdapterTrait for RawLogFsAdapter {
    fn truncate(&self) -> Result<()> {
        self.ensure_parent()?;
        File::create(&self.path)
            .with_context(|| format!("Failed to truncate raw log {:?}", self.path))?;
        tracing::debug!("Truncated raw log {:?}", self.path);
        Ok(())
    }

    fn append(&self, record: &UsageRecord) -> Result<()> {
        self.ensure_parent()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open raw log {:?}", self.path))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer(&mut writer, record).context("Failed to encode usage record")?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn open_reader(&self) -> Result<Box<dyn BufRead + Send>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open raw log {:?} for reading", self.path))?;
        Ok(Box::new(BufReader::new(file)))
    }
}
