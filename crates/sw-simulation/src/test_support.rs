//! Scripted collaborators shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sw_core::{
    REGION_SIZE, RegionContent, RegionCoord, RegionRect, Tile, TileCoord, TileObject, WorldSnapshot,
};

use crate::error::{SimError, SimResult};
use crate::generator::{Fulfillment, RecvOutcome, RegionGenerator};
use crate::persistence::PersistenceSink;
use crate::presentation::{Presentation, VisibleRegions};

/// A one-tile floor region at the origin.
pub fn room() -> RegionContent {
    RegionContent::from_tiles([(TileCoord::new(0, 0), Tile::new(TileObject::Floor))])
}

/// A fully walkable `REGION_SIZE` square region at `coord`.
pub fn open_room(coord: RegionCoord) -> RegionContent {
    let origin = coord.origin_tile(REGION_SIZE);
    RegionContent::from_tiles((0..REGION_SIZE).flat_map(|dx| {
        (0..REGION_SIZE).map(move |dy| {
            (
                TileCoord::new(origin.x + dx, origin.y + dy),
                Tile::new(TileObject::Floor),
            )
        })
    }))
}

/// A region made entirely of walls.
pub fn solid_room(coord: RegionCoord) -> RegionContent {
    let origin = coord.origin_tile(REGION_SIZE);
    RegionContent::from_tiles((0..REGION_SIZE).flat_map(|dx| {
        (0..REGION_SIZE).map(move |dy| {
            (
                TileCoord::new(origin.x + dx, origin.y + dy),
                Tile::new(TileObject::Wall),
            )
        })
    }))
}

/// In-memory generator. With `auto_fulfill` every request is answered
/// immediately with an open room; otherwise tests push fulfillments by hand.
/// With `reversed` the newest answer is delivered first.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    pub requests: Vec<RegionCoord>,
    pub outbox: VecDeque<Fulfillment>,
    pub auto_fulfill: bool,
    pub reversed: bool,
    pub solid: bool,
    pub disconnected: bool,
    pub started: bool,
    pub halted: bool,
    pub joins_in_time: bool,
    pub fail_start: bool,
}

impl ScriptedGenerator {
    pub fn auto() -> Self {
        Self {
            auto_fulfill: true,
            joins_in_time: true,
            ..Self::default()
        }
    }

    pub fn requests_for(&self, coord: RegionCoord) -> usize {
        self.requests.iter().filter(|c| **c == coord).count()
    }

    /// Queue an answer for `coord`, requested or not.
    pub fn release(&mut self, coord: RegionCoord, content: RegionContent) {
        let fulfillment = Fulfillment::new(coord, content);
        if self.reversed {
            self.outbox.push_front(fulfillment);
        } else {
            self.outbox.push_back(fulfillment);
        }
    }
}

impl RegionGenerator for ScriptedGenerator {
    fn start(&mut self) -> SimResult<()> {
        if self.fail_start {
            return Err(SimError::Generator("refused to start".into()));
        }
        self.started = true;
        Ok(())
    }

    fn request(&mut self, coord: RegionCoord) {
        self.requests.push(coord);
        if self.auto_fulfill {
            let content = if self.solid {
                solid_room(coord)
            } else {
                open_room(coord)
            };
            self.release(coord, content);
        }
    }

    fn try_recv(&mut self) -> Option<Fulfillment> {
        self.outbox.pop_front()
    }

    fn recv_blocking(&mut self, _timeout: Option<Duration>) -> RecvOutcome {
        match self.outbox.pop_front() {
            Some(f) => RecvOutcome::Ready(f),
            None if self.disconnected => RecvOutcome::Disconnected,
            None => RecvOutcome::TimedOut,
        }
    }

    fn halt(&mut self) {
        self.halted = true;
    }

    fn join(&mut self, _timeout: Duration) -> bool {
        self.joins_in_time
    }
}

/// Presentation with a fixed viewport that records what it was shown.
#[derive(Debug)]
pub struct FixedViewport {
    pub rect: RegionRect,
    pub queries: u64,
    pub reports: Vec<usize>,
    pub last: VisibleRegions,
}

impl FixedViewport {
    pub fn new(rect: RegionRect) -> Self {
        Self {
            rect,
            queries: 0,
            reports: Vec::new(),
            last: VisibleRegions::new(),
        }
    }

    /// Coordinates shown on the latest tick, sorted.
    pub fn last_coords(&self) -> Vec<RegionCoord> {
        let mut coords: Vec<RegionCoord> = self.last.keys().copied().collect();
        coords.sort_unstable();
        coords
    }
}

impl Presentation for FixedViewport {
    fn viewport_boundary(&mut self) -> RegionRect {
        self.queries += 1;
        self.rect
    }

    fn set_visible_regions(&mut self, regions: VisibleRegions) {
        self.reports.push(regions.len());
        self.last = regions;
    }
}

/// Sink recording the tick of every persisted snapshot.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub ticks: Arc<Mutex<Vec<u64>>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn persisted(&self) -> Vec<u64> {
        self.ticks.lock().unwrap().clone()
    }
}

impl PersistenceSink for RecordingSink {
    fn persist(&mut self, snapshot: &WorldSnapshot) -> SimResult<()> {
        if self.fail {
            return Err(SimError::Persistence("disk full".into()));
        }
        self.ticks.lock().unwrap().push(snapshot.tick);
        Ok(())
    }
}
