use std::collections::HashMap;

use crate::coord::RegionCoord;
use crate::region::RegionContent;
use crate::snapshot::WorldSnapshot;

/// A World Store entry.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionSlot {
    /// Requested from the generator, not yet fulfilled.
    Pending,
    /// Fulfilled content.
    Resident(RegionContent),
}

/// What the store knows about a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    /// Never requested.
    Absent,
    /// Requested, waiting for the generator.
    Pending,
    /// Content is available.
    Resident,
}

/// The spatial cache: region coordinate to region slot.
///
/// There is no eviction; the store grows for the lifetime of the process.
/// Pending placeholders are never handed out as content.
#[derive(Debug, Clone, Default)]
pub struct WorldStore {
    slots: HashMap<RegionCoord, RegionSlot>,
    resident: usize,
}

impl WorldStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Content of a resident region. Pending and absent regions yield `None`.
    pub fn get(&self, coord: RegionCoord) -> Option<&RegionContent> {
        match self.slots.get(&coord) {
            Some(RegionSlot::Resident(content)) => Some(content),
            _ => None,
        }
    }

    /// Mutable content of a resident region.
    pub fn get_mut(&mut self, coord: RegionCoord) -> Option<&mut RegionContent> {
        match self.slots.get_mut(&coord) {
            Some(RegionSlot::Resident(content)) => Some(content),
            _ => None,
        }
    }

    /// Install content at `coord`, replacing a placeholder or older content.
    /// Returns the previous content if the region was already resident.
    pub fn put(&mut self, coord: RegionCoord, content: RegionContent) -> Option<RegionContent> {
        match self.slots.insert(coord, RegionSlot::Resident(content)) {
            Some(RegionSlot::Resident(old)) => Some(old),
            _ => {
                self.resident += 1;
                None
            }
        }
    }

    /// Insert an empty placeholder. A resident region is left untouched.
    /// Returns `true` if a new placeholder was inserted.
    pub fn mark_pending(&mut self, coord: RegionCoord) -> bool {
        if self.slots.contains_key(&coord) {
            return false;
        }
        self.slots.insert(coord, RegionSlot::Pending);
        true
    }

    /// Return `true` if `coord` is resident.
    pub fn contains(&self, coord: RegionCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Distinguish absent, pending, and resident coordinates.
    pub fn state(&self, coord: RegionCoord) -> RegionState {
        match self.slots.get(&coord) {
            None => RegionState::Absent,
            Some(RegionSlot::Pending) => RegionState::Pending,
            Some(RegionSlot::Resident(_)) => RegionState::Resident,
        }
    }

    /// Number of resident regions.
    pub fn resident_count(&self) -> usize {
        self.resident
    }

    /// Number of pending placeholders.
    pub fn pending_count(&self) -> usize {
        self.slots.len() - self.resident
    }

    /// Coordinates of all resident regions, sorted.
    pub fn resident_coords(&self) -> Vec<RegionCoord> {
        let mut coords: Vec<RegionCoord> = self
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, RegionSlot::Resident(_)))
            .map(|(c, _)| *c)
            .collect();
        coords.sort_unstable();
        coords
    }

    /// Iterate over resident regions in arbitrary order.
    pub fn residents(&self) -> impl Iterator<Item = (RegionCoord, &RegionContent)> {
        self.slots.iter().filter_map(|(c, slot)| match slot {
            RegionSlot::Resident(content) => Some((*c, content)),
            RegionSlot::Pending => None,
        })
    }

    /// Capture all resident regions. Placeholders are not part of a snapshot.
    pub fn snapshot(&self, tick: u64) -> WorldSnapshot {
        WorldSnapshot::new(
            tick,
            self.residents().map(|(c, content)| (c, content.clone())),
        )
    }

    /// Install every region of a snapshot. Returns the restored coordinates.
    pub fn restore(&mut self, snapshot: WorldSnapshot) -> Vec<RegionCoord> {
        snapshot
            .regions
            .into_iter()
            .map(|(coord, content)| {
                self.put(coord, content);
                coord
            })
            .collect()
    }
}
