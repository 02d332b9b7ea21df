//! Reference region generator for Swarmworld.
//!
//! [`GeneratorWorker`] runs a [`RoomSynth`] on a dedicated thread and speaks
//! the [`sw_simulation::RegionGenerator`] protocol: requests go in over one
//! channel, finished regions come back over another in whatever order they
//! complete. [`CavernSynth`] is a small deterministic room layout used by the
//! CLI and the tests.

/// Error types for the generator crate.
pub mod error;
/// Room synthesizers.
pub mod synth;
/// The generator worker thread.
pub mod worker;

/// Re-exports of [`error::WorldgenError`] and [`error::WorldgenResult`].
pub use error::{WorldgenError, WorldgenResult};
/// Re-exports of the synthesizers.
pub use synth::{CavernSynth, RoomSynth};
/// Re-export of [`worker::GeneratorWorker`].
pub use worker::GeneratorWorker;
