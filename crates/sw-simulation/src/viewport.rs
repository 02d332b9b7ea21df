use std::collections::VecDeque;
use std::sync::Arc;

use sw_core::{RegionCoord, RegionRect};

/// Remembers the expansion of the last few viewport rectangles.
///
/// Viewports repeat across many consecutive ticks, so the most recent
/// rectangles are kept most-recently-used first. Capacity 0 recomputes on
/// every call.
#[derive(Debug)]
pub struct ViewportCache {
    capacity: usize,
    entries: VecDeque<(RegionRect, Arc<[RegionCoord]>)>,
    hits: u64,
    misses: u64,
}

impl ViewportCache {
    /// Create a cache holding at most `capacity` rectangles.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Coordinates covered by `rect`.
    pub fn expand(&mut self, rect: RegionRect) -> Arc<[RegionCoord]> {
        if let Some(pos) = self.entries.iter().position(|(r, _)| *r == rect) {
            self.hits += 1;
            if pos > 0
                && let Some(entry) = self.entries.remove(pos)
            {
                self.entries.push_front(entry);
            }
            return Arc::clone(&self.entries[0].1);
        }

        self.misses += 1;
        let coords: Arc<[RegionCoord]> = rect.coords().into();
        if self.capacity > 0 {
            if self.entries.len() == self.capacity {
                self.entries.pop_back();
            }
            self.entries.push_front((rect, Arc::clone(&coords)));
        }
        coords
    }

    /// Rectangles currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to expand the rectangle.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
