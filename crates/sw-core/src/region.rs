use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::coord::TileCoord;
use crate::entity::EntityId;

/// Terrain or object tag carried by every tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileObject {
    /// Open ground. The only walkable tag.
    Floor,
    /// Solid rock.
    Wall,
    /// Debris blocking movement.
    Rubble,
    /// Standing water.
    Water,
}

impl TileObject {
    /// Return `true` if entities may stand on this tile.
    pub fn is_walkable(self) -> bool {
        matches!(self, Self::Floor)
    }
}

/// A single tile descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// What occupies the tile.
    pub object: TileObject,
}

impl Tile {
    /// A tile carrying the given tag.
    pub const fn new(object: TileObject) -> Self {
        Self { object }
    }

    /// Shorthand for [`TileObject::is_walkable`].
    pub fn is_walkable(&self) -> bool {
        self.object.is_walkable()
    }
}

/// Content of one region as produced by the generator.
///
/// The occupant index starts empty; entity apply phases fill it in as
/// entities enter and leave the region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionContent {
    /// Tiles keyed by world-global tile coordinate.
    #[serde(with = "tile_entries")]
    pub tiles: HashMap<TileCoord, Tile>,
    /// Entities currently standing in this region.
    #[serde(default)]
    pub occupants: BTreeMap<EntityId, TileCoord>,
}

impl RegionContent {
    /// Region content built from the given tiles with an empty occupant index.
    pub fn from_tiles(tiles: impl IntoIterator<Item = (TileCoord, Tile)>) -> Self {
        Self {
            tiles: tiles.into_iter().collect(),
            occupants: BTreeMap::new(),
        }
    }

    /// Look up a tile.
    pub fn tile(&self, at: TileCoord) -> Option<&Tile> {
        self.tiles.get(&at)
    }

    /// Return `true` if the tile exists and is walkable.
    pub fn is_walkable(&self, at: TileCoord) -> bool {
        self.tile(at).is_some_and(Tile::is_walkable)
    }

    /// All walkable tiles, sorted for stable iteration.
    pub fn walkable_tiles(&self) -> Vec<TileCoord> {
        let mut out: Vec<TileCoord> = self
            .tiles
            .iter()
            .filter(|(_, t)| t.is_walkable())
            .map(|(c, _)| *c)
            .collect();
        out.sort_unstable();
        out
    }

    /// Record that `id` stands at `at`.
    pub fn place_occupant(&mut self, id: EntityId, at: TileCoord) {
        self.occupants.insert(id, at);
    }

    /// Forget `id`. Returns its last recorded tile.
    pub fn remove_occupant(&mut self, id: EntityId) -> Option<TileCoord> {
        self.occupants.remove(&id)
    }
}

/// JSON object keys must be strings, so the tile map is stored as a list.
mod tile_entries {
    use std::collections::HashMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Tile;
    use crate::coord::TileCoord;

    #[derive(Serialize, Deserialize)]
    struct Entry {
        at: TileCoord,
        #[serde(flatten)]
        tile: Tile,
    }

    pub fn serialize<S: Serializer>(
        tiles: &HashMap<TileCoord, Tile>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<Entry> = tiles
            .iter()
            .map(|(at, tile)| Entry {
                at: *at,
                tile: *tile,
            })
            .collect();
        entries.sort_unstable_by_key(|e| e.at);
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<TileCoord, Tile>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries.into_iter().map(|e| (e.at, e.tile)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RegionContent {
        RegionContent::from_tiles([
            (TileCoord::new(0, 0), Tile::new(TileObject::Wall)),
            (TileCoord::new(1, 0), Tile::new(TileObject::Floor)),
            (TileCoord::new(0, 1), Tile::new(TileObject::Floor)),
            (TileCoord::new(1, 1), Tile::new(TileObject::Water)),
        ])
    }

    #[test]
    fn only_floor_is_walkable() {
        assert!(TileObject::Floor.is_walkable());
        assert!(!TileObject::Wall.is_walkable());
        assert!(!TileObject::Rubble.is_walkable());
        assert!(!TileObject::Water.is_walkable());
    }

    #[test]
    fn walkable_tiles_sorted() {
        let region = sample();
        assert_eq!(
            region.walkable_tiles(),
            vec![TileCoord::new(0, 1), TileCoord::new(1, 0)]
        );
        assert!(region.is_walkable(TileCoord::new(1, 0)));
        assert!(!region.is_walkable(TileCoord::new(5, 5)));
    }

    #[test]
    fn occupant_index_tracks_entities() {
        let mut region = sample();
        assert!(region.occupants.is_empty());
        let id = EntityId::new();
        region.place_occupant(id, TileCoord::new(1, 0));
        region.place_occupant(id, TileCoord::new(0, 1));
        assert_eq!(region.occupants.len(), 1);
        assert_eq!(region.remove_occupant(id), Some(TileCoord::new(0, 1)));
        assert_eq!(region.remove_occupant(id), None);
    }

    #[test]
    fn json_uses_tile_entry_list() {
        let region = sample();
        let json = serde_json::to_value(&region).unwrap();
        let tiles = json["tiles"].as_array().unwrap();
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0]["object"], "wall");

        let back: RegionContent = serde_json::from_value(json).unwrap();
        assert_eq!(back, region);
    }

    #[test]
    fn missing_occupants_default_to_empty() {
        let json = r#"{"tiles":[{"at":{"x":2,"y":3},"object":"floor"}]}"#;
        let region: RegionContent = serde_json::from_str(json).unwrap();
        assert!(region.occupants.is_empty());
        assert!(region.is_walkable(TileCoord::new(2, 3)));
    }
}
