use rand::Rng;
use sw_core::{RegionCoord, TileCoord, WorldStore};

use crate::entity::Entity;
use crate::error::{SimError, SimResult};

/// A walkable tile chosen for a seed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSite {
    /// Region holding the tile.
    pub region: RegionCoord,
    /// The tile itself.
    pub tile: TileCoord,
}

/// Create `count` entities on random walkable tiles of resident regions.
///
/// Each attempt picks a random resident region and a random tile in it.
/// After `max_attempts` consecutive misses for one entity, seeding fails
/// with [`SimError::SeedingExhausted`].
pub fn seed_entities<R, F>(
    world: &WorldStore,
    rng: &mut R,
    count: usize,
    max_attempts: u32,
    mut make: F,
) -> SimResult<Vec<Box<dyn Entity>>>
where
    R: Rng,
    F: FnMut(SpawnSite, &mut R) -> Box<dyn Entity>,
{
    if count == 0 {
        return Ok(Vec::new());
    }

    // Sorted so a seeded RNG always picks the same sites.
    let regions: Vec<(RegionCoord, Vec<TileCoord>)> = world
        .resident_coords()
        .into_iter()
        .filter_map(|coord| {
            let content = world.get(coord)?;
            let mut tiles: Vec<TileCoord> = content.tiles.keys().copied().collect();
            tiles.sort_unstable();
            Some((coord, tiles))
        })
        .collect();
    if regions.is_empty() {
        return Err(SimError::NoResidentRegions);
    }

    let mut seeded = Vec::with_capacity(count);
    while seeded.len() < count {
        let site = pick_walkable(world, &regions, rng, max_attempts).ok_or(
            SimError::SeedingExhausted {
                attempts: max_attempts,
                seeded: seeded.len(),
                requested: count,
            },
        )?;
        seeded.push(make(site, rng));
    }
    Ok(seeded)
}

fn pick_walkable<R: Rng>(
    world: &WorldStore,
    regions: &[(RegionCoord, Vec<TileCoord>)],
    rng: &mut R,
    max_attempts: u32,
) -> Option<SpawnSite> {
    for _ in 0..max_attempts {
        let (region, tiles) = &regions[rng.random_range(0..regions.len())];
        if tiles.is_empty() {
            continue;
        }
        let tile = tiles[rng.random_range(0..tiles.len())];
        if world.get(*region).is_some_and(|r| r.is_walkable(tile)) {
            return Some(SpawnSite {
                region: *region,
                tile,
            });
        }
    }
    None
}
