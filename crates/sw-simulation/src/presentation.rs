use std::collections::HashMap;

use sw_core::{RegionContent, RegionCoord, RegionRect};

/// Resident regions visible this tick, cloned out of the World Store.
pub type VisibleRegions = HashMap<RegionCoord, RegionContent>;

/// The presentation layer, seen from the tick loop.
pub trait Presentation {
    /// Current viewport boundary in region units (exclusive upper bounds).
    /// Typically the same rectangle for many consecutive ticks.
    fn viewport_boundary(&mut self) -> RegionRect;

    /// Receive the regions that are resident inside the viewport.
    fn set_visible_regions(&mut self, regions: VisibleRegions);
}
