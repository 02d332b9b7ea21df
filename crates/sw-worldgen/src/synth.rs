use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sw_core::{REGION_SIZE, RegionContent, RegionCoord, Tile, TileCoord, TileObject};

/// Produces the content of one region.
///
/// Runs on the generator thread, so implementations must be `Send`.
pub trait RoomSynth: Send + 'static {
    /// Build the region at `coord`.
    fn synthesize(&mut self, coord: RegionCoord) -> RegionContent;
}

/// A walled cave room with one doorway in the middle of each side.
///
/// The interior is floor strewn with rubble and pools of water. Layout is a
/// pure function of the seed and the coordinate, so the same region always
/// comes out the same no matter when or in what order it is requested.
/// Doorways sit at the same offset on every side, which lines them up with
/// the doorways of the neighbouring rooms.
#[derive(Debug, Clone)]
pub struct CavernSynth {
    seed: u64,
    size: i32,
    rubble_chance: f64,
    water_chance: f64,
}

impl CavernSynth {
    /// A synthesizer producing `REGION_SIZE` rooms.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            size: REGION_SIZE,
            rubble_chance: 0.08,
            water_chance: 0.04,
        }
    }

    /// Set the chance of an interior tile being rubble.
    pub fn with_rubble_chance(mut self, chance: f64) -> Self {
        self.rubble_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Set the chance of an interior tile being water.
    pub fn with_water_chance(mut self, chance: f64) -> Self {
        self.water_chance = chance.clamp(0.0, 1.0);
        self
    }

    fn rng_for(&self, coord: RegionCoord) -> StdRng {
        let key = (u64::from(coord.x as u32) << 32) | u64::from(coord.y as u32);
        StdRng::seed_from_u64(self.seed ^ key.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    fn is_doorway(&self, dx: i32, dy: i32) -> bool {
        let mid = self.size / 2;
        let edge = self.size - 1;
        (dx == mid && (dy == 0 || dy == edge)) || (dy == mid && (dx == 0 || dx == edge))
    }
}

impl RoomSynth for CavernSynth {
    fn synthesize(&mut self, coord: RegionCoord) -> RegionContent {
        let mut rng = self.rng_for(coord);
        let origin = coord.origin_tile(self.size);
        let edge = self.size - 1;

        let mut tiles = Vec::with_capacity((self.size * self.size) as usize);
        for dx in 0..self.size {
            for dy in 0..self.size {
                let border = dx == 0 || dy == 0 || dx == edge || dy == edge;
                let object = if border && !self.is_doorway(dx, dy) {
                    TileObject::Wall
                } else if border {
                    TileObject::Floor
                } else {
                    let roll: f64 = rng.random();
                    if roll < self.rubble_chance {
                        TileObject::Rubble
                    } else if roll < self.rubble_chance + self.water_chance {
                        TileObject::Water
                    } else {
                        TileObject::Floor
                    }
                };
                tiles.push((TileCoord::new(origin.x + dx, origin.y + dy), Tile::new(object)));
            }
        }
        RegionContent::from_tiles(tiles)
    }
}
