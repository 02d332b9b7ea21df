use rayon::prelude::*;
use sw_core::WorldStore;

use crate::config::ExecutionMode;
use crate::entity::{ApplyContext, Entity, Occupancy, UpdateContext};

/// What one lifecycle pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Entities that ran update and apply.
    pub updated: usize,
    /// Entities spawned during apply.
    pub spawned: usize,
    /// Entities removed by the liveness filter.
    pub reaped: usize,
}

/// The set of live entities.
#[derive(Debug, Default)]
pub struct Population {
    entities: Vec<Box<dyn Entity>>,
}

impl Population {
    /// An empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity and record it in its region's occupant index.
    pub fn insert(&mut self, entity: Box<dyn Entity>, world: &mut WorldStore) {
        if let Some(region) = world.get_mut(entity.region()) {
            region.place_occupant(entity.id(), entity.position());
        }
        self.entities.push(entity);
    }

    /// Run update, apply, and reap for `tick`.
    pub fn advance(
        &mut self,
        tick: u64,
        world: &mut WorldStore,
        mode: ExecutionMode,
    ) -> AdvanceReport {
        let updated = self.entities.len();

        let occupancy = Occupancy::from_entities(&self.entities);
        let view = UpdateContext {
            tick,
            world: &*world,
            occupancy: &occupancy,
        };
        match mode {
            ExecutionMode::Serial => {
                for entity in &mut self.entities {
                    entity.update(&view);
                }
            }
            ExecutionMode::Parallel => {
                self.entities
                    .par_iter_mut()
                    .for_each(|entity| entity.update(&view));
            }
        }

        let mut ctx = ApplyContext::new(tick, world);
        for entity in &mut self.entities {
            entity.apply(&mut ctx);
        }
        let spawned = ctx.into_spawned();
        let spawned_count = spawned.len();
        for entity in spawned {
            self.insert(entity, world);
        }

        let reaped = self.reap(world);
        AdvanceReport {
            updated,
            spawned: spawned_count,
            reaped,
        }
    }

    fn reap(&mut self, world: &mut WorldStore) -> usize {
        let before = self.entities.len();
        self.entities.retain(|entity| {
            if entity.is_alive() {
                return true;
            }
            if let Some(region) = world.get_mut(entity.region()) {
                region.remove_occupant(entity.id());
            }
            false
        });
        before - self.entities.len()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Return `true` if no entities remain.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over the live entities.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Entity + 'static)> {
        self.entities.iter().map(|e| e.as_ref())
    }
}
