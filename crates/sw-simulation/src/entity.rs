use std::collections::HashMap;
use std::fmt;

use sw_core::{EntityId, RegionCoord, TileCoord, WorldStore};

/// An autonomous actor advanced once per tick.
///
/// Each tick runs in two phases. `update` decides what to do from a
/// read-only view of the world and must not affect anything other entities
/// can observe. `apply` then commits that decision, may mutate the world,
/// may spawn offspring, and may mark the entity dead. Dead entities are
/// dropped after the apply phase.
pub trait Entity: fmt::Debug + Send {
    /// Stable identifier.
    fn id(&self) -> EntityId;

    /// Short label for the concrete kind, used in logs and saves.
    fn kind(&self) -> &str;

    /// Current tile.
    fn position(&self) -> TileCoord;

    /// Region containing [`Entity::position`].
    fn region(&self) -> RegionCoord {
        self.position().containing_region()
    }

    /// Liveness flag. Once `false` the entity is reaped after this tick.
    fn is_alive(&self) -> bool;

    /// Phase 1: compute the intended change for this tick.
    fn update(&mut self, ctx: &UpdateContext<'_>);

    /// Phase 2: commit the change computed in [`Entity::update`].
    fn apply(&mut self, ctx: &mut ApplyContext<'_>);
}

/// Where every live entity stood at the start of the tick.
#[derive(Debug, Default)]
pub struct Occupancy {
    tiles: HashMap<TileCoord, Vec<EntityId>>,
}

impl Occupancy {
    /// Index the positions of `entities`.
    pub fn from_entities(entities: &[Box<dyn Entity>]) -> Self {
        let mut tiles: HashMap<TileCoord, Vec<EntityId>> = HashMap::new();
        for entity in entities {
            tiles.entry(entity.position()).or_default().push(entity.id());
        }
        Self { tiles }
    }

    /// Entities standing on `at`.
    pub fn at(&self, at: TileCoord) -> &[EntityId] {
        self.tiles.get(&at).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Return `true` if anyone stands on `at`.
    pub fn is_occupied(&self, at: TileCoord) -> bool {
        !self.at(at).is_empty()
    }
}

/// Read-only view handed to [`Entity::update`].
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    /// The tick being computed.
    pub tick: u64,
    /// World state as of the start of the tick.
    pub world: &'a WorldStore,
    /// Entity positions as of the start of the tick.
    pub occupancy: &'a Occupancy,
}

impl UpdateContext<'_> {
    /// Return `true` if `at` lies in a resident region and is walkable.
    pub fn is_walkable(&self, at: TileCoord) -> bool {
        self.world
            .get(at.containing_region())
            .is_some_and(|region| region.is_walkable(at))
    }
}

/// Mutable view handed to [`Entity::apply`].
#[derive(Debug)]
pub struct ApplyContext<'a> {
    /// The tick being committed.
    pub tick: u64,
    /// The World Store, writable during apply.
    pub world: &'a mut WorldStore,
    spawned: Vec<Box<dyn Entity>>,
}

impl<'a> ApplyContext<'a> {
    /// Open an apply phase over `world`.
    pub fn new(tick: u64, world: &'a mut WorldStore) -> Self {
        Self {
            tick,
            world,
            spawned: Vec::new(),
        }
    }

    /// Queue a new entity. It joins the population after this apply phase
    /// and is first updated on the next tick.
    pub fn spawn(&mut self, entity: Box<dyn Entity>) {
        self.spawned.push(entity);
    }

    /// Entities queued so far.
    pub fn spawned_len(&self) -> usize {
        self.spawned.len()
    }

    /// Move `id` in the per-region occupant index from `from` to `to`.
    pub fn relocate(&mut self, id: EntityId, from: TileCoord, to: TileCoord) {
        if let Some(region) = self.world.get_mut(from.containing_region()) {
            region.remove_occupant(id);
        }
        if let Some(region) = self.world.get_mut(to.containing_region()) {
            region.place_occupant(id, to);
        }
    }

    /// Remove `id` from the occupant index of the region containing `at`.
    pub fn vacate(&mut self, id: EntityId, at: TileCoord) {
        if let Some(region) = self.world.get_mut(at.containing_region()) {
            region.remove_occupant(id);
        }
    }

    pub(crate) fn into_spawned(self) -> Vec<Box<dyn Entity>> {
        self.spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::open_room;

    #[derive(Debug)]
    struct Marker {
        id: EntityId,
        at: TileCoord,
    }

    impl Entity for Marker {
        fn id(&self) -> EntityId {
            self.id
        }
        fn kind(&self) -> &str {
            "marker"
        }
        fn position(&self) -> TileCoord {
            self.at
        }
        fn is_alive(&self) -> bool {
            true
        }
        fn update(&mut self, _ctx: &UpdateContext<'_>) {}
        fn apply(&mut self, _ctx: &mut ApplyContext<'_>) {}
    }

    #[test]
    fn occupancy_groups_by_tile() {
        let entities: Vec<Box<dyn Entity>> = (0..2)
            .map(|_| {
                Box::new(Marker {
                    id: EntityId::new(),
                    at: TileCoord::new(1, 1),
                }) as Box<dyn Entity>
            })
            .collect();
        let occupancy = Occupancy::from_entities(&entities);
        assert_eq!(occupancy.at(TileCoord::new(1, 1)).len(), 2);
        assert!(!occupancy.is_occupied(TileCoord::new(0, 0)));
    }

    #[test]
    fn update_context_walkability_needs_resident_region() {
        let mut world = WorldStore::new();
        world.put(RegionCoord::new(0, 0), open_room(RegionCoord::new(0, 0)));
        world.mark_pending(RegionCoord::new(1, 0));
        let occupancy = Occupancy::default();
        let ctx = UpdateContext {
            tick: 0,
            world: &world,
            occupancy: &occupancy,
        };
        assert!(ctx.is_walkable(TileCoord::new(3, 3)));
        assert!(!ctx.is_walkable(TileCoord::new(16, 0)));
        assert!(!ctx.is_walkable(TileCoord::new(-1, 0)));
    }

    #[test]
    fn relocate_moves_between_regions() {
        let mut world = WorldStore::new();
        let west = RegionCoord::new(0, 0);
        let east = RegionCoord::new(1, 0);
        world.put(west, open_room(west));
        world.put(east, open_room(east));
        let id = EntityId::new();
        let from = TileCoord::new(15, 2);
        let to = TileCoord::new(16, 2);
        world.get_mut(west).unwrap().place_occupant(id, from);

        {
            let mut ctx = ApplyContext::new(0, &mut world);
            ctx.relocate(id, from, to);
            ctx.spawn(Box::new(Marker {
                id: EntityId::new(),
                at: to,
            }));
            assert_eq!(ctx.spawned_len(), 1);
        }

        assert!(world.get(west).unwrap().occupants.is_empty());
        assert_eq!(world.get(east).unwrap().occupants.get(&id), Some(&to));
    }
}
