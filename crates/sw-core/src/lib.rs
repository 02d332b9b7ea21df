//! Core types for Swarmworld: region coordinates, tiles, and the world store.
//!
//! This crate defines the spatial data model shared by the simulation core and
//! its collaborators. It has no notion of time or threads; the simulation
//! crate owns the single [`WorldStore`] and is its only writer.

/// Region and tile coordinates, and viewport rectangles.
pub mod coord;
/// Entity identifiers.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Region content: tiles and the per-region occupant index.
pub mod region;
/// Serializable snapshots of resident world state.
pub mod snapshot;
/// The world store mapping region coordinates to region slots.
pub mod store;

/// Re-export coordinate types.
pub use coord::{REGION_SIZE, RegionCoord, RegionRect, TileCoord};
/// Re-export entity identifier.
pub use entity::EntityId;
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export region content types.
pub use region::{RegionContent, Tile, TileObject};
/// Re-export snapshot type.
pub use snapshot::WorldSnapshot;
/// Re-export world store types.
pub use store::{RegionSlot, RegionState, WorldStore};
