use std::collections::HashSet;

use sw_core::{RegionCoord, WorldStore};
use tracing::trace;

use crate::generator::RegionGenerator;
use crate::presentation::VisibleRegions;

/// Decides which regions to hand out and which to request.
///
/// Guarantees at most one outstanding generation request per coordinate.
/// The requested set only ever grows: the store never evicts, so a
/// fulfilled coordinate is resident forever and its entry here is inert.
/// Adding eviction would require removing the coordinate here as well.
#[derive(Debug, Default)]
pub struct RegionCache {
    requested: HashSet<RegionCoord>,
    requests_issued: u64,
    duplicates_suppressed: u64,
}

impl RegionCache {
    /// Create a controller with an empty requested set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the resident subset of `coords`, requesting every coordinate
    /// that is neither resident nor already requested.
    pub fn reconcile<G: RegionGenerator + ?Sized>(
        &mut self,
        coords: &[RegionCoord],
        store: &mut WorldStore,
        generator: &mut G,
    ) -> VisibleRegions {
        let mut visible = VisibleRegions::with_capacity(coords.len());
        for &coord in coords {
            if let Some(content) = store.get(coord) {
                visible.insert(coord, content.clone());
            } else if self.requested.contains(&coord) {
                self.duplicates_suppressed += 1;
            } else {
                self.issue(coord, store, generator);
            }
        }
        visible
    }

    /// Request every coordinate of `coords` not yet resident or requested.
    /// Returns the number of new requests.
    pub fn request_block<G: RegionGenerator + ?Sized>(
        &mut self,
        coords: &[RegionCoord],
        store: &mut WorldStore,
        generator: &mut G,
    ) -> usize {
        let before = self.requests_issued;
        for &coord in coords {
            if !store.contains(coord) && !self.requested.contains(&coord) {
                self.issue(coord, store, generator);
            }
        }
        (self.requests_issued - before) as usize
    }

    /// Record coordinates that became resident without a request, such as
    /// regions restored from a save.
    pub fn mark_known(&mut self, coords: impl IntoIterator<Item = RegionCoord>) {
        self.requested.extend(coords);
    }

    fn issue<G: RegionGenerator + ?Sized>(
        &mut self,
        coord: RegionCoord,
        store: &mut WorldStore,
        generator: &mut G,
    ) {
        let inserted = self.requested.insert(coord);
        debug_assert!(inserted, "duplicate generation request for {coord}");
        store.mark_pending(coord);
        generator.request(coord);
        self.requests_issued += 1;
        trace!(%coord, "requested region");
    }

    /// Return `true` if `coord` has ever been requested.
    pub fn is_requested(&self, coord: RegionCoord) -> bool {
        self.requested.contains(&coord)
    }

    /// Size of the requested set.
    pub fn requested_len(&self) -> usize {
        self.requested.len()
    }

    /// Generation requests sent so far.
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    /// Lookups of still-pending coordinates that were not re-requested.
    pub fn duplicates_suppressed(&self) -> u64 {
        self.duplicates_suppressed
    }
}
