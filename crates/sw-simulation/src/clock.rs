/// Monotonic tick counter.
///
/// Starts at 0 and is advanced exactly once per completed tick. Doubles as
/// the logical clock handed to entities and as the persistence cadence.
#[derive(Debug, Clone, Default)]
pub struct TickClock {
    tick: u64,
}

impl TickClock {
    /// Create a clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Completed ticks so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Return `true` if a periodic persist is due after the current tick.
    pub fn persist_due(&self, interval: u64) -> bool {
        interval > 0 && self.tick > 0 && self.tick % interval == 0
    }
}
