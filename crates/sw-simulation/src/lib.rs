//! Tick-driven simulation core for Swarmworld.
//!
//! A [`TickScheduler`] owns the authoritative [`sw_core::WorldStore`] and a
//! population of entities. Regions are streamed in on demand: the
//! presentation reports a viewport, the [`RegionCache`] requests whatever is
//! missing from an asynchronous [`RegionGenerator`], and fulfillments are
//! installed at the start of the next tick. Entities advance in two phases
//! (update, then apply) and dead ones are reaped at the end of every tick.

/// Region cache controller: visible subset and duplicate-free requests.
pub mod cache;
/// Monotonic tick counter.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// The entity trait and its per-phase contexts.
pub mod entity;
/// Error types for the simulation crate.
pub mod error;
/// The generator collaborator interface.
pub mod generator;
/// Cooperative stop flag.
pub mod halt;
/// Snapshot sinks.
pub mod persistence;
/// The live entity set and its update/apply/reap pass.
pub mod population;
/// The presentation collaborator interface.
pub mod presentation;
/// The tick loop.
pub mod scheduler;
/// Random placement of entities on walkable tiles.
pub mod seeding;
/// The swarmling reference entity.
pub mod swarm;
/// Bounded cache of viewport expansions.
pub mod viewport;

#[cfg(test)]
mod test_support;

/// Re-export of [`cache::RegionCache`].
pub use cache::RegionCache;
/// Re-export of [`clock::TickClock`].
pub use clock::TickClock;
/// Re-exports of [`config::SimConfig`] and [`config::ExecutionMode`].
pub use config::{ExecutionMode, SimConfig};
/// Re-exports of the entity contract.
pub use entity::{ApplyContext, Entity, Occupancy, UpdateContext};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of the generator interface.
pub use generator::{Fulfillment, RecvOutcome, RegionGenerator};
/// Re-export of [`halt::HaltSignal`].
pub use halt::HaltSignal;
/// Re-exports of the persistence sinks.
pub use persistence::{JsonFileSink, NullSink, PersistenceSink};
/// Re-exports of [`population::Population`] and [`population::AdvanceReport`].
pub use population::{AdvanceReport, Population};
/// Re-exports of the presentation interface.
pub use presentation::{Presentation, VisibleRegions};
/// Re-exports of the scheduler and its reports.
pub use scheduler::{RunSummary, TickReport, TickScheduler};
/// Re-exports of [`seeding::seed_entities`] and [`seeding::SpawnSite`].
pub use seeding::{SpawnSite, seed_entities};
/// Re-export of [`swarm::Swarmling`].
pub use swarm::Swarmling;
/// Re-export of [`viewport::ViewportCache`].
pub use viewport::ViewportCache;
