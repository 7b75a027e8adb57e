use std::io::BufRead;

use anyhow::Result;

use super::usage_record_entity::UsageRecord;

/// Storage for the append-only raw usage log.
pub trait RawLogFsAdapterTrait: Send + Sync {
    /// Empties the log at the start of a collection run.
    fn truncate(&self) -> Result<()>;

    /// Appends one record as a single line.
    fn append(&self, record: &UsageRecord) -> Result<()>;

    /// Opens the log for one sequential read.
    fn open_reader(&self) -> Result<Box<dyn BufRead + Send>>;
}
