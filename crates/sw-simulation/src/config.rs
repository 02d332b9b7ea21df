use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How Phase 1 (`update`) of the entity lifecycle is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Update entities one after another on the tick thread.
    #[default]
    Serial,
    /// Update entities on the rayon pool. Apply stays serial.
    Parallel,
}

/// Static settings for a simulation run, fixed at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed used for entity seeding.
    pub seed: u64,
    /// Target ticks per second. 0 disables the pacing sleep.
    pub tick_rate: f64,
    /// Side length of the square block of regions requested at startup.
    pub initial_grid: i32,
    /// Number of entities seeded at startup.
    pub initial_population: usize,
    /// Persist the world every this many ticks. 0 = only on shutdown.
    pub persist_interval: u64,
    /// Consecutive non-walkable picks tolerated per seeded entity.
    pub seed_attempts: u32,
    /// How long shutdown waits for the generator worker.
    #[serde(with = "millis")]
    pub join_timeout: Duration,
    /// Per-region wait during the startup drain. `None` waits forever.
    #[serde(with = "opt_millis")]
    pub startup_timeout: Option<Duration>,
    /// Distinct viewport rectangles whose expansion is cached.
    pub viewport_cache_capacity: usize,
    /// Serial or parallel entity update.
    pub execution: ExecutionMode,
    /// Stop after this many ticks even without a halt signal.
    pub max_ticks: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate: 60.0,
            initial_grid: 5,
            initial_population: 100,
            persist_interval: 10_000,
            seed_attempts: 10_000,
            join_timeout: Duration::from_secs(3),
            startup_timeout: None,
            viewport_cache_capacity: 8,
            execution: ExecutionMode::Serial,
            max_ticks: None,
        }
    }
}

impl SimConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the target tick rate (ticks per second, 0 = unpaced).
    pub fn with_tick_rate(mut self, rate: f64) -> Self {
        self.tick_rate = rate.max(0.0);
        self
    }

    /// Set the side length of the initial region block.
    pub fn with_initial_grid(mut self, size: i32) -> Self {
        self.initial_grid = size.max(0);
        self
    }

    /// Set the number of seeded entities.
    pub fn with_initial_population(mut self, count: usize) -> Self {
        self.initial_population = count;
        self
    }

    /// Set the periodic persistence interval in ticks (0 = shutdown only).
    pub fn with_persist_interval(mut self, ticks: u64) -> Self {
        self.persist_interval = ticks;
        self
    }

    /// Set the seeding retry bound.
    pub fn with_seed_attempts(mut self, attempts: u32) -> Self {
        self.seed_attempts = attempts.max(1);
        self
    }

    /// Set the generator join timeout.
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Bound each wait of the startup drain.
    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = Some(timeout);
        self
    }

    /// Set the viewport expansion cache capacity.
    pub fn with_viewport_cache_capacity(mut self, capacity: usize) -> Self {
        self.viewport_cache_capacity = capacity;
        self
    }

    /// Select serial or parallel entity update.
    pub fn with_execution(mut self, mode: ExecutionMode) -> Self {
        self.execution = mode;
        self
    }

    /// Stop the loop after `ticks` completed ticks.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Sleep inserted after every tick. Rates too small for the interval
    /// to fit in a `Duration` run unpaced.
    pub fn tick_interval(&self) -> Option<Duration> {
        if self.tick_rate > 0.0 && self.tick_rate.is_finite() {
            Duration::try_from_secs_f64(1.0 / self.tick_rate).ok()
        } else {
            None
        }
    }

    /// Number of regions requested at startup.
    pub fn initial_region_count(&self) -> usize {
        let side = self.initial_grid.max(0) as usize;
        side * side
    }

    /// Parse a JSON settings document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

mod opt_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        d.map(|d| d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
