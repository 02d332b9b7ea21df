use std::fmt;

use serde::{Deserialize, Serialize};

/// Side length of every region, in tiles.
pub const REGION_SIZE: i32 = 16;

/// Identifies a region in the fixed-size grid partition of the world.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct RegionCoord {
    /// Column of the region.
    pub x: i32,
    /// Row of the region.
    pub y: i32,
}

impl RegionCoord {
    /// Create a region coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The tile at the top-left corner of this region.
    pub fn origin_tile(self, region_size: i32) -> TileCoord {
        TileCoord::new(self.x * region_size, self.y * region_size)
    }
}

impl From<(i32, i32)> for RegionCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A world-global tile position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TileCoord {
    /// Horizontal tile position.
    pub x: i32,
    /// Vertical tile position.
    pub y: i32,
}

impl TileCoord {
    /// Create a tile coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The region containing this tile, for regions `region_size` tiles wide.
    pub fn region(self, region_size: i32) -> RegionCoord {
        RegionCoord::new(
            self.x.div_euclid(region_size),
            self.y.div_euclid(region_size),
        )
    }

    /// The region containing this tile under the standard [`REGION_SIZE`].
    pub fn containing_region(self) -> RegionCoord {
        self.region(REGION_SIZE)
    }

    /// The four orthogonal neighbours, in N, E, S, W order.
    pub fn neighbors(self) -> [TileCoord; 4] {
        [
            TileCoord::new(self.x, self.y - 1),
            TileCoord::new(self.x + 1, self.y),
            TileCoord::new(self.x, self.y + 1),
            TileCoord::new(self.x - 1, self.y),
        ]
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Axis-aligned rectangle of region coordinates with exclusive upper bounds.
///
/// A viewport boundary reported by the presentation layer is expressed in
/// region units; `(0, 0)-(2, 2)` covers the four regions `(0..2) x (0..2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RegionRect {
    /// Inclusive lower x bound.
    pub min_x: i32,
    /// Inclusive lower y bound.
    pub min_y: i32,
    /// Exclusive upper x bound.
    pub max_x: i32,
    /// Exclusive upper y bound.
    pub max_y: i32,
}

impl RegionRect {
    /// Create a rectangle from its lower (inclusive) and upper (exclusive) corners.
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// A `width x height` rectangle anchored at `origin`.
    pub fn with_size(origin: RegionCoord, width: i32, height: i32) -> Self {
        Self::new(origin.x, origin.y, origin.x + width, origin.y + height)
    }

    /// Width in regions, zero for inverted rectangles.
    pub fn width(&self) -> usize {
        (i64::from(self.max_x) - i64::from(self.min_x)).max(0) as usize
    }

    /// Height in regions, zero for inverted rectangles.
    pub fn height(&self) -> usize {
        (i64::from(self.max_y) - i64::from(self.min_y)).max(0) as usize
    }

    /// Number of region coordinates covered, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        self.width().saturating_mul(self.height())
    }

    /// Return `true` if the rectangle covers no coordinates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return `true` if `coord` lies inside the rectangle.
    pub fn contains(&self, coord: RegionCoord) -> bool {
        coord.x >= self.min_x && coord.x < self.max_x && coord.y >= self.min_y && coord.y < self.max_y
    }

    /// Shift the rectangle by `(dx, dy)` regions.
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.min_x + dx,
            self.min_y + dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    /// Expand to the exact set of covered coordinates, x-major.
    pub fn coords(&self) -> Vec<RegionCoord> {
        let mut out = Vec::with_capacity(self.len());
        for x in self.min_x..self.max_x {
            for y in self.min_y..self.max_y {
                out.push(RegionCoord::new(x, y));
            }
        }
        out
    }
}

impl fmt::Display for RegionRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}
