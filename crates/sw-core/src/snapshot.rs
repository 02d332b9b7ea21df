use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::RegionCoord;
use crate::error::{CoreError, CoreResult};
use crate::region::RegionContent;

/// Schema version written into every snapshot.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Full resident state of the world at a given tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Format version, checked on load.
    pub schema_version: u32,
    /// Completed ticks when the snapshot was taken.
    pub tick: u64,
    /// Wall-clock capture time.
    pub saved_at: DateTime<Utc>,
    /// Resident regions sorted by coordinate.
    pub regions: Vec<(RegionCoord, RegionContent)>,
}

impl WorldSnapshot {
    /// Build a snapshot, sorting regions by coordinate.
    pub fn new(tick: u64, regions: impl IntoIterator<Item = (RegionCoord, RegionContent)>) -> Self {
        let mut regions: Vec<_> = regions.into_iter().collect();
        regions.sort_unstable_by_key(|(c, _)| *c);
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            tick,
            saved_at: Utc::now(),
            regions,
        }
    }

    /// Number of regions captured.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Total tiles across all regions.
    pub fn tile_count(&self) -> usize {
        self.regions.iter().map(|(_, r)| r.tiles.len()).sum()
    }

    /// Total indexed occupants across all regions.
    pub fn occupant_count(&self) -> usize {
        self.regions.iter().map(|(_, r)| r.occupants.len()).sum()
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON, rejecting unknown schema versions.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(CoreError::SchemaVersion {
                found: snapshot.schema_version,
                expected: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Read and decode a snapshot file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
