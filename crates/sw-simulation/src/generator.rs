use std::time::Duration;

use sw_core::{RegionContent, RegionCoord};

use crate::error::SimResult;

/// A region produced by the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Fulfillment {
    /// Where the content belongs.
    pub coord: RegionCoord,
    /// The generated region.
    pub content: RegionContent,
}

impl Fulfillment {
    /// Pair a coordinate with its content.
    pub fn new(coord: RegionCoord, content: RegionContent) -> Self {
        Self { coord, content }
    }
}

/// Result of a blocking receive on the generator output.
#[derive(Debug)]
pub enum RecvOutcome {
    /// A region arrived.
    Ready(Fulfillment),
    /// Nothing arrived within the timeout.
    TimedOut,
    /// The generator is gone and will never produce again.
    Disconnected,
}

/// The asynchronous region generator, seen from the tick loop.
///
/// Requests are fire-and-forget; fulfillments arrive on an output channel in
/// no particular order and with unbounded latency.
pub trait RegionGenerator {
    /// Start the worker.
    fn start(&mut self) -> SimResult<()>;

    /// Ask for the region at `coord`. Never blocks.
    fn request(&mut self, coord: RegionCoord);

    /// Pop one fulfillment if one is waiting. Never blocks.
    fn try_recv(&mut self) -> Option<Fulfillment>;

    /// Wait for one fulfillment. `None` waits indefinitely.
    fn recv_blocking(&mut self, timeout: Option<Duration>) -> RecvOutcome;

    /// Ask the worker to stop.
    fn halt(&mut self);

    /// Wait up to `timeout` for the worker to finish. Returns `true` if it did.
    fn join(&mut self, timeout: Duration) -> bool;
}
