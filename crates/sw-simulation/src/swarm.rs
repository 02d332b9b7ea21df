use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sw_core::{EntityId, TileCoord};

use crate::entity::{ApplyContext, Entity, UpdateContext};
use crate::seeding::SpawnSite;

/// Energy a freshly seeded swarmling starts with.
pub const SEED_ENERGY: u32 = 60;
/// Energy at which a swarmling splits off an offspring.
pub const BROOD_ENERGY: u32 = 90;
/// Energy regained by a tick spent foraging in place.
const FORAGE_GAIN: u32 = 3;
/// Chance of foraging instead of moving when a move is possible.
const FORAGE_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Forage,
    Move(TileCoord),
    Brood(TileCoord),
}

/// A simple swarm creature: wanders over walkable floor, forages to
/// regain energy, broods when well fed, and starves at zero energy.
///
/// Every swarmling carries its own RNG so decisions can be made in
/// parallel without shared state.
#[derive(Debug)]
pub struct Swarmling {
    id: EntityId,
    position: TileCoord,
    energy: u32,
    alive: bool,
    intent: Intent,
    rng: StdRng,
}

impl Swarmling {
    /// A swarmling at `position` with `energy`, deciding with `seed`.
    pub fn new(position: TileCoord, energy: u32, seed: u64) -> Self {
        Self {
            id: EntityId::new(),
            position,
            energy,
            alive: energy > 0,
            intent: Intent::Forage,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed factory for the scheduler's startup.
    pub fn seed<R: Rng>(site: SpawnSite, rng: &mut R) -> Box<dyn Entity> {
        Box::new(Self::new(site.tile, SEED_ENERGY, rng.random()))
    }

    /// Remaining energy.
    pub fn energy(&self) -> u32 {
        self.energy
    }
}

impl Entity for Swarmling {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> &str {
        "swarmling"
    }

    fn position(&self) -> TileCoord {
        self.position
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn update(&mut self, ctx: &UpdateContext<'_>) {
        let open: Vec<TileCoord> = self
            .position
            .neighbors()
            .into_iter()
            .filter(|t| ctx.is_walkable(*t) && !ctx.occupancy.is_occupied(*t))
            .collect();

        self.intent = if open.is_empty() || self.rng.random_bool(FORAGE_CHANCE) {
            Intent::Forage
        } else {
            let target = open[self.rng.random_range(0..open.len())];
            if self.energy >= BROOD_ENERGY {
                Intent::Brood(target)
            } else {
                Intent::Move(target)
            }
        };
    }

    fn apply(&mut self, ctx: &mut ApplyContext<'_>) {
        match self.intent {
            Intent::Forage => {
                self.energy = self.energy.saturating_add(FORAGE_GAIN);
            }
            Intent::Move(to) => {
                ctx.relocate(self.id, self.position, to);
                self.position = to;
            }
            Intent::Brood(at) => {
                let share = self.energy / 2;
                self.energy -= share;
                ctx.spawn(Box::new(Swarmling::new(at, share, self.rng.random())));
            }
        }

        self.energy = self.energy.saturating_sub(1);
        if self.energy == 0 {
            self.alive = false;
            ctx.vacate(self.id, self.position);
        }
    }
}
