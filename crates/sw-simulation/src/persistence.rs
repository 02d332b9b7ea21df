use std::fs;
use std::path::{Path, PathBuf};

use sw_core::WorldSnapshot;
use tracing::debug;

use crate::error::SimResult;

/// Durable storage for World Store snapshots.
pub trait PersistenceSink {
    /// Store a full snapshot, replacing any previous one.
    fn persist(&mut self, snapshot: &WorldSnapshot) -> SimResult<()>;
}

/// Discards every snapshot.
#[derive(Debug, Default)]
pub struct NullSink;

impl PersistenceSink for NullSink {
    fn persist(&mut self, _snapshot: &WorldSnapshot) -> SimResult<()> {
        Ok(())
    }
}

/// Writes snapshots as JSON to a single file.
///
/// Each write goes to a sibling temp file which is then renamed over the
/// target, so a crash mid-write leaves the previous save intact.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    writes: u64,
}

impl JsonFileSink {
    /// Persist to `path`. Parent directories are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writes: 0,
        }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of successful writes.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "world".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceSink for JsonFileSink {
    fn persist(&mut self, snapshot: &WorldSnapshot) -> SimResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = snapshot.to_json()?;
        let tmp = self.temp_path();
        if let Err(err) = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        self.writes += 1;
        debug!(
            path = %self.path.display(),
            tick = snapshot.tick,
            regions = snapshot.region_count(),
            "wrote world snapshot"
        );
        Ok(())
    }
}
