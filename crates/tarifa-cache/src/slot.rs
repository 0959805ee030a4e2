use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tarifa_models::snapshot::{parse_date, SlotRecord};

use crate::daily::MissReason;
use crate::error::CacheError;

/// The single on-disk slot holding today's rendered prices.
///
/// There is no locking: the last writer wins. Writes go to a sibling
/// `.tmp` file first and are renamed into place.
pub struct SlotFile {
    path: PathBuf,
}

impl SlotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the record. Every failure is reported as a miss reason.
    pub async fn read(&self) -> Result<SlotRecord, MissReason> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(MissReason::Absent),
            Err(e) => return Err(MissReason::Unreadable(e.to_string())),
        };

        let record = SlotRecord::from_file_contents(&contents)
            .ok_or_else(|| MissReason::Corrupt("empty slot file".to_string()))?;

        if parse_date(&record.date).is_none() {
            return Err(MissReason::Corrupt(format!(
                "invalid date key {:?}",
                record.date
            )));
        }

        Ok(record)
    }

    /// Overwrite the slot with `record`.
    pub async fn write(&self, record: &SlotRecord) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, record.to_file_contents()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "slot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
