use sw_core::RegionRect;
use sw_simulation::{Presentation, VisibleRegions};

/// Headless presentation whose viewport drifts east over time.
///
/// Stands in for a renderer: it only remembers how many regions it was
/// shown, which is enough to watch regions stream in.
#[derive(Debug)]
pub struct PanningViewport {
    rect: RegionRect,
    pan_every: u64,
    queries: u64,
    last_visible: usize,
    most_visible: usize,
}

impl PanningViewport {
    /// Start at `rect`, shifting one region east every `pan_every` queries.
    pub fn new(rect: RegionRect, pan_every: u64) -> Self {
        Self {
            rect,
            pan_every,
            queries: 0,
            last_visible: 0,
            most_visible: 0,
        }
    }

    /// Current viewport rectangle.
    pub fn rect(&self) -> RegionRect {
        self.rect
    }

    /// Regions shown on the latest tick.
    pub fn last_visible(&self) -> usize {
        self.last_visible
    }

    /// Largest number of regions shown on any tick.
    pub fn most_visible(&self) -> usize {
        self.most_visible
    }
}

impl Presentation for PanningViewport {
    fn viewport_boundary(&mut self) -> RegionRect {
        if self.pan_every > 0 && self.queries > 0 && self.queries % self.pan_every == 0 {
            self.rect = self.rect.translated(1, 0);
        }
        self.queries += 1;
        self.rect
    }

    fn set_visible_regions(&mut self, regions: VisibleRegions) {
        self.last_visible = regions.len();
        self.most_visible = self.most_visible.max(self.last_visible);
    }
}
