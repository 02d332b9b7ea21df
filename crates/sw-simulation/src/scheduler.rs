use std::thread;

use rand::SeedableRng;
use rand::rngs::StdRng;
use sw_core::{RegionCoord, RegionRect, WorldSnapshot, WorldStore};
use tracing::{debug, error, info, warn};

use crate::cache::RegionCache;
use crate::clock::TickClock;
use crate::config::SimConfig;
use crate::entity::Entity;
use crate::error::{SimError, SimResult};
use crate::generator::{RecvOutcome, RegionGenerator};
use crate::halt::HaltSignal;
use crate::persistence::PersistenceSink;
use crate::population::{AdvanceReport, Population};
use crate::presentation::Presentation;
use crate::seeding::{SpawnSite, seed_entities};
use crate::viewport::ViewportCache;

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number that was executed (0-based).
    pub tick: u64,
    /// Fulfillments installed by the drain step.
    pub installed: usize,
    /// Entity lifecycle counts.
    pub advance: AdvanceReport,
    /// Regions handed to the presentation.
    pub visible: usize,
    /// New generation requests issued by the view reconciliation.
    pub requested: usize,
}

/// Totals reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed ticks.
    pub ticks: u64,
    /// Live entities at shutdown.
    pub population: usize,
    /// Resident regions at shutdown.
    pub resident_regions: usize,
    /// Regions still waiting for the generator.
    pub pending_regions: usize,
    /// Generation requests issued over the whole run.
    pub requests_issued: u64,
    /// Successful snapshot writes, including the final one.
    pub persists: u64,
    /// Periodic snapshot writes that failed.
    pub persist_failures: u64,
    /// Whether the generator finished within the join timeout.
    pub generator_joined: bool,
}

/// The tick loop.
///
/// Owns the World Store, the entity population, and the region cache
/// controller. Collaborators are injected: a [`RegionGenerator`] that
/// produces regions asynchronously, a [`Presentation`] that reports the
/// viewport and receives visible regions, and a [`PersistenceSink`] for
/// snapshots. A [`HaltSignal`] stops the loop from outside.
pub struct TickScheduler<G, P, S> {
    config: SimConfig,
    generator: G,
    presentation: P,
    sink: S,
    halt: HaltSignal,
    world: WorldStore,
    cache: RegionCache,
    viewport: ViewportCache,
    population: Population,
    clock: TickClock,
    rng: StdRng,
    persists: u64,
    persist_failures: u64,
}

impl<G, P, S> std::fmt::Debug for TickScheduler<G, P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickScheduler")
            .field("tick", &self.clock.tick())
            .field("population", &self.population.len())
            .field("resident", &self.world.resident_count())
            .field("pending", &self.world.pending_count())
            .finish()
    }
}

impl<G, P, S> TickScheduler<G, P, S>
where
    G: RegionGenerator,
    P: Presentation,
    S: PersistenceSink,
{
    /// Create a scheduler with an empty world.
    pub fn new(config: SimConfig, generator: G, presentation: P, sink: S, halt: HaltSignal) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let viewport = ViewportCache::new(config.viewport_cache_capacity);
        Self {
            config,
            generator,
            presentation,
            sink,
            halt,
            world: WorldStore::new(),
            cache: RegionCache::new(),
            viewport,
            population: Population::new(),
            clock: TickClock::new(),
            rng,
            persists: 0,
            persist_failures: 0,
        }
    }

    /// Install a saved snapshot before startup. Restored regions are
    /// resident and will never be requested from the generator.
    ///
    /// Entities are not part of a snapshot, so saved occupant entries are
    /// dropped and rebuilt by seeding.
    pub fn restore(&mut self, snapshot: WorldSnapshot) -> usize {
        let saved_tick = snapshot.tick;
        let coords = self.world.restore(snapshot);
        for coord in &coords {
            if let Some(region) = self.world.get_mut(*coord) {
                region.occupants.clear();
            }
        }
        let count = coords.len();
        self.cache.mark_known(coords);
        info!(regions = count, saved_tick, "restored world snapshot");
        count
    }

    /// Start the generator, wait for the initial block of regions, and seed
    /// the population with entities built by `make`.
    ///
    /// Returns the number of seeded entities.
    pub fn startup<F>(&mut self, make: F) -> SimResult<usize>
    where
        F: FnMut(SpawnSite, &mut StdRng) -> Box<dyn Entity>,
    {
        self.generator.start()?;

        let side = self.config.initial_grid;
        let block = RegionRect::with_size(RegionCoord::new(0, 0), side, side).coords();
        let expected = self
            .cache
            .request_block(&block, &mut self.world, &mut self.generator);
        info!(expected, "waiting for initial regions");

        for received in 0..expected {
            match self.generator.recv_blocking(self.config.startup_timeout) {
                RecvOutcome::Ready(fulfillment) => {
                    self.world.put(fulfillment.coord, fulfillment.content);
                }
                RecvOutcome::TimedOut => {
                    return Err(SimError::StartupTimeout {
                        waited: self.config.startup_timeout.unwrap_or_default(),
                        received,
                        expected,
                    });
                }
                RecvOutcome::Disconnected => {
                    return Err(SimError::GeneratorDisconnected { received, expected });
                }
            }
        }

        let seeded = seed_entities(
            &self.world,
            &mut self.rng,
            self.config.initial_population,
            self.config.seed_attempts,
            make,
        )?;
        let count = seeded.len();
        for entity in seeded {
            self.population.insert(entity, &mut self.world);
        }

        info!(
            regions = self.world.resident_count(),
            entities = count,
            "startup complete"
        );
        Ok(count)
    }

    /// Install every fulfillment waiting on the generator output.
    pub fn drain_generator(&mut self) -> usize {
        let mut installed = 0;
        while let Some(fulfillment) = self.generator.try_recv() {
            self.world.put(fulfillment.coord, fulfillment.content);
            installed += 1;
        }
        installed
    }

    /// Run one tick: drain, advance entities, reconcile the view, pace.
    pub fn tick(&mut self) -> TickReport {
        let tick = self.clock.tick();
        let installed = self.drain_generator();

        let advance = self
            .population
            .advance(tick, &mut self.world, self.config.execution);

        let rect = self.presentation.viewport_boundary();
        let coords = self.viewport.expand(rect);
        let issued_before = self.cache.requests_issued();
        let visible = self
            .cache
            .reconcile(&coords, &mut self.world, &mut self.generator);
        let requested = (self.cache.requests_issued() - issued_before) as usize;
        let visible_count = visible.len();
        self.presentation.set_visible_regions(visible);

        self.clock.advance();
        debug!(
            tick,
            installed,
            updated = advance.updated,
            spawned = advance.spawned,
            reaped = advance.reaped,
            visible = visible_count,
            requested,
            "tick"
        );

        if let Some(interval) = self.config.tick_interval() {
            thread::sleep(interval);
        }

        TickReport {
            tick,
            installed,
            advance,
            visible: visible_count,
            requested,
        }
    }

    /// Tick until halted (or until `max_ticks`), then shut down.
    pub fn run(&mut self) -> SimResult<RunSummary> {
        info!(
            tick_rate = self.config.tick_rate,
            persist_interval = self.config.persist_interval,
            execution = ?self.config.execution,
            "tick loop started"
        );

        loop {
            if self.halt.is_halted() {
                info!(tick = self.clock.tick(), "halt requested");
                break;
            }
            if self
                .config
                .max_ticks
                .is_some_and(|max| self.clock.tick() >= max)
            {
                info!(tick = self.clock.tick(), "tick limit reached");
                break;
            }

            self.tick();

            if self.clock.persist_due(self.config.persist_interval)
                && let Err(err) = self.persist()
            {
                error!(tick = self.clock.tick(), %err, "periodic persist failed");
            }
        }

        self.shutdown()
    }

    /// Stop the generator, wait for it, and persist the final state.
    pub fn shutdown(&mut self) -> SimResult<RunSummary> {
        self.generator.halt();
        let generator_joined = self.generator.join(self.config.join_timeout);
        if !generator_joined {
            warn!(
                timeout = ?self.config.join_timeout,
                "generator did not stop in time"
            );
        }

        self.persist()?;

        let summary = self.summary(generator_joined);
        info!(
            ticks = summary.ticks,
            population = summary.population,
            regions = summary.resident_regions,
            "simulation stopped"
        );
        Ok(summary)
    }

    fn persist(&mut self) -> SimResult<()> {
        let snapshot = self.world.snapshot(self.clock.tick());
        match self.sink.persist(&snapshot) {
            Ok(()) => {
                self.persists += 1;
                info!(
                    tick = snapshot.tick,
                    regions = snapshot.region_count(),
                    "persisted world"
                );
                Ok(())
            }
            Err(err) => {
                self.persist_failures += 1;
                Err(err)
            }
        }
    }

    fn summary(&self, generator_joined: bool) -> RunSummary {
        RunSummary {
            ticks: self.clock.tick(),
            population: self.population.len(),
            resident_regions: self.world.resident_count(),
            pending_regions: self.world.pending_count(),
            requests_issued: self.cache.requests_issued(),
            persists: self.persists,
            persist_failures: self.persist_failures,
            generator_joined,
        }
    }

    /// The World Store.
    pub fn world(&self) -> &WorldStore {
        &self.world
    }

    /// The live entities.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// The tick counter.
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// The region cache controller.
    pub fn cache(&self) -> &RegionCache {
        &self.cache
    }

    /// The viewport expansion cache.
    pub fn viewport_cache(&self) -> &ViewportCache {
        &self.viewport
    }

    /// The injected generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// The injected presentation.
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// The injected persistence sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// A handle that stops this scheduler's loop when triggered.
    pub fn halt_signal(&self) -> HaltSignal {
        self.halt.clone()
    }

    /// Active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use crate::presentation::VisibleRegions;
    use crate::swarm::Swarmling;
    use crate::test_support::{
        FixedViewport, RecordingSink, ScriptedGenerator, open_room, solid_room,
    };
    use std::time::Duration;
    use sw_core::{EntityId, RegionState, TileCoord};

    type Scripted = TickScheduler<ScriptedGenerator, FixedViewport, RecordingSink>;

    fn config() -> SimConfig {
        SimConfig::default()
            .with_tick_rate(0.0)
            .with_initial_grid(2)
            .with_initial_population(4)
    }

    /// Viewport far away from the initial block.
    fn far_view() -> FixedViewport {
        FixedViewport::new(RegionRect::new(10, 0, 12, 2))
    }

    fn scheduler(config: SimConfig, generator: ScriptedGenerator) -> Scripted {
        TickScheduler::new(
            config,
            generator,
            far_view(),
            RecordingSink::default(),
            HaltSignal::new(),
        )
    }

    #[test]
    fn startup_makes_initial_block_resident() {
        let mut sched = scheduler(SimConfig::default().with_tick_rate(0.0), ScriptedGenerator::auto());
        let seeded = sched.startup(Swarmling::seed).unwrap();

        assert!(sched.generator().started);
        assert_eq!(seeded, 100);
        assert_eq!(sched.population().len(), 100);
        assert_eq!(sched.world().resident_count(), 25);
        assert_eq!(sched.world().pending_count(), 0);
        for x in 0..5 {
            for y in 0..5 {
                let c = RegionCoord::new(x, y);
                assert_eq!(sched.world().state(c), RegionState::Resident);
                assert_eq!(sched.generator().requests_for(c), 1);
            }
        }
        for entity in sched.population().iter() {
            let region = sched.world().get(entity.region()).unwrap();
            assert!(region.is_walkable(entity.position()));
        }
    }

    #[test]
    fn startup_fails_when_generator_disconnects() {
        let generator = ScriptedGenerator {
            disconnected: true,
            ..ScriptedGenerator::default()
        };
        let err = scheduler(config(), generator)
            .startup(Swarmling::seed)
            .unwrap_err();
        assert!(matches!(
            err,
            SimError::GeneratorDisconnected {
                received: 0,
                expected: 4
            }
        ));
    }

    #[test]
    fn startup_timeout_is_reported() {
        let config = config().with_startup_timeout(Duration::from_millis(5));
        let err = scheduler(config, ScriptedGenerator::default())
            .startup(Swarmling::seed)
            .unwrap_err();
        assert!(matches!(err, SimError::StartupTimeout { expected: 4, .. }));
    }

    #[test]
    fn startup_propagates_generator_start_failure() {
        let generator = ScriptedGenerator {
            fail_start: true,
            ..ScriptedGenerator::auto()
        };
        let err = scheduler(config(), generator)
            .startup(Swarmling::seed)
            .unwrap_err();
        assert!(matches!(err, SimError::Generator(_)));
    }

    #[test]
    fn seeding_on_all_walls_is_exhausted() {
        let generator = ScriptedGenerator {
            solid: true,
            ..ScriptedGenerator::auto()
        };
        let config = config().with_seed_attempts(200);
        let err = scheduler(config, generator)
            .startup(Swarmling::seed)
            .unwrap_err();
        assert!(matches!(
            err,
            SimError::SeedingExhausted {
                attempts: 200,
                seeded: 0,
                requested: 4
            }
        ));
    }

    #[test]
    fn tick_counter_is_monotonic() {
        let mut sched = scheduler(config(), ScriptedGenerator::auto());
        sched.startup(Swarmling::seed).unwrap();
        for expected in 0..5 {
            let report = sched.tick();
            assert_eq!(report.tick, expected);
            assert_eq!(sched.clock().tick(), expected + 1);
        }
    }

    #[test]
    fn draining_an_empty_channel_is_a_no_op() {
        let mut sched = scheduler(config(), ScriptedGenerator::auto());
        sched.startup(Swarmling::seed).unwrap();
        let resident = sched.world().resident_count();
        let pending = sched.world().pending_count();
        let before = sched.world().snapshot(0);

        assert_eq!(sched.drain_generator(), 0);
        assert_eq!(sched.world().resident_count(), resident);
        assert_eq!(sched.world().pending_count(), pending);
        assert_eq!(sched.world().snapshot(0).regions, before.regions);
    }

    #[test]
    fn startup_accepts_reversed_fulfillment() {
        let generator = ScriptedGenerator {
            reversed: true,
            ..ScriptedGenerator::auto()
        };
        let mut sched = scheduler(config(), generator);
        sched.startup(Swarmling::seed).unwrap();
        assert_eq!(sched.world().resident_count(), 4);
        assert_eq!(sched.world().pending_count(), 0);
    }

    #[test]
    fn out_of_order_fulfillment_fills_viewport_piecewise() {
        let mut sched = scheduler(config(), ScriptedGenerator::auto());
        sched.startup(Swarmling::seed).unwrap();
        sched.generator.auto_fulfill = false;

        let [a, b, c, d] =
            [(10, 0), (10, 1), (11, 0), (11, 1)].map(|(x, y)| RegionCoord::new(x, y));
        assert_eq!(sched.tick().requested, 4);

        sched.generator.release(d, open_room(d));
        sched.generator.release(a, open_room(a));
        let report = sched.tick();
        assert_eq!((report.installed, report.visible, report.requested), (2, 2, 0));
        assert_eq!(sched.presentation().last_coords(), vec![a, d]);
        assert_eq!(sched.world().state(b), RegionState::Pending);
        assert_eq!(sched.world().state(c), RegionState::Pending);

        sched.generator.release(c, open_room(c));
        let report = sched.tick();
        assert_eq!((report.installed, report.visible, report.requested), (1, 3, 0));
        assert_eq!(sched.presentation().last_coords(), vec![a, c, d]);
        assert_eq!(sched.world().state(b), RegionState::Pending);

        sched.generator.release(b, open_room(b));
        let report = sched.tick();
        assert_eq!((report.installed, report.visible, report.requested), (1, 4, 0));
        assert_eq!(sched.world().pending_count(), 0);
        assert_eq!(sched.presentation().reports, vec![0, 2, 3, 4]);
        for coord in [a, b, c, d] {
            assert_eq!(sched.generator().requests_for(coord), 1);
        }
    }

    #[test]
    fn repeated_fulfillment_replaces_resident_content() {
        let mut sched = scheduler(config(), ScriptedGenerator::auto());
        sched.startup(Swarmling::seed).unwrap();
        sched.tick();
        assert_eq!(sched.tick().visible, 4);

        let target = RegionCoord::new(10, 0);
        let replacement = solid_room(target);
        assert_ne!(sched.world().get(target), Some(&replacement));
        let resident = sched.world().resident_count();
        let issued = sched.cache().requests_issued();

        sched.generator.release(target, replacement.clone());
        let report = sched.tick();

        assert_eq!(report.installed, 1);
        assert_eq!(report.requested, 0);
        assert_eq!(report.visible, 4);
        assert_eq!(sched.world().get(target), Some(&replacement));
        assert_eq!(sched.presentation().last.get(&target), Some(&replacement));
        assert_eq!(sched.world().resident_count(), resident);
        assert_eq!(sched.cache().requests_issued(), issued);
        assert_eq!(sched.generator().requests_for(target), 1);
    }

    #[test]
    fn far_viewport_streams_in_over_two_ticks() {
        let mut sched = scheduler(config(), ScriptedGenerator::auto());
        sched.startup(Swarmling::seed).unwrap();

        let first = sched.tick();
        assert_eq!(first.requested, 4);
        assert_eq!(first.visible, 0);
        assert_eq!(sched.world().pending_count(), 4);

        let second = sched.tick();
        assert_eq!(second.installed, 4);
        assert_eq!(second.requested, 0);
        assert_eq!(second.visible, 4);
        assert_eq!(sched.presentation().reports, vec![0, 4]);
        assert_eq!(sched.presentation().queries, 2);

        for coord in RegionRect::new(10, 0, 12, 2).coords() {
            assert_eq!(sched.generator().requests_for(coord), 1);
        }
    }

    #[test]
    fn pending_regions_are_requested_once() {
        let mut sched = scheduler(config(), ScriptedGenerator::auto());
        sched.startup(Swarmling::seed).unwrap();
        sched.generator.auto_fulfill = false;

        for _ in 0..10 {
            let report = sched.tick();
            assert_eq!(report.visible, 0);
        }
        assert_eq!(sched.generator().requests.len(), 4 + 4);
        assert_eq!(sched.cache().duplicates_suppressed(), 9 * 4);
        assert_eq!(sched.viewport_cache().hits(), 9);
    }

    #[test]
    fn persists_on_interval_and_on_shutdown() {
        let sink = RecordingSink::default();
        let mut sched = TickScheduler::new(
            config().with_persist_interval(3).with_max_ticks(7),
            ScriptedGenerator::auto(),
            far_view(),
            sink.clone(),
            HaltSignal::new(),
        );
        sched.startup(Swarmling::seed).unwrap();
        let summary = sched.run().unwrap();

        assert_eq!(summary.ticks, 7);
        assert_eq!(summary.persists, 3);
        assert_eq!(sink.persisted(), vec![3, 6, 7]);
        assert!(sched.generator().halted);
        assert!(summary.generator_joined);
    }

    #[test]
    fn zero_interval_persists_only_on_shutdown() {
        let sink = RecordingSink::default();
        let mut sched = TickScheduler::new(
            config().with_persist_interval(0).with_max_ticks(5),
            ScriptedGenerator::auto(),
            far_view(),
            sink.clone(),
            HaltSignal::new(),
        );
        sched.startup(Swarmling::seed).unwrap();
        sched.run().unwrap();
        assert_eq!(sink.persisted(), vec![5]);
    }

    #[test]
    fn periodic_persist_failure_keeps_ticking() {
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let mut sched = TickScheduler::new(
            config().with_persist_interval(1).with_max_ticks(3),
            ScriptedGenerator::auto(),
            far_view(),
            sink,
            HaltSignal::new(),
        );
        sched.startup(Swarmling::seed).unwrap();
        let err = sched.run().unwrap_err();

        assert!(matches!(err, SimError::Persistence(_)));
        assert_eq!(sched.clock().tick(), 3);
        assert!(sched.generator().halted);
    }

    #[test]
    fn halt_before_run_stops_immediately() {
        let halt = HaltSignal::new();
        let sink = RecordingSink::default();
        let mut sched = TickScheduler::new(
            config(),
            ScriptedGenerator::auto(),
            far_view(),
            sink.clone(),
            halt.clone(),
        );
        sched.startup(Swarmling::seed).unwrap();
        halt.trigger();

        let summary = sched.run().unwrap();
        assert_eq!(summary.ticks, 0);
        assert_eq!(sink.persisted(), vec![0]);
        assert!(sched.generator().halted);
    }

    /// Presentation that pulls the halt signal on its `n`-th query.
    #[derive(Debug)]
    struct HaltAfter {
        halt: HaltSignal,
        remaining: u32,
    }

    impl Presentation for HaltAfter {
        fn viewport_boundary(&mut self) -> RegionRect {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.halt.trigger();
            }
            RegionRect::new(0, 0, 1, 1)
        }

        fn set_visible_regions(&mut self, _regions: VisibleRegions) {}
    }

    #[test]
    fn halt_mid_run_completes_the_current_tick() {
        let halt = HaltSignal::new();
        let presentation = HaltAfter {
            halt: halt.clone(),
            remaining: 3,
        };
        let mut sched = TickScheduler::new(
            config(),
            ScriptedGenerator::auto(),
            presentation,
            RecordingSink::default(),
            halt,
        );
        sched.startup(Swarmling::seed).unwrap();
        let summary = sched.run().unwrap();
        assert_eq!(summary.ticks, 3);
    }

    #[test]
    fn join_timeout_is_not_fatal() {
        let generator = ScriptedGenerator {
            joins_in_time: false,
            ..ScriptedGenerator::auto()
        };
        let mut sched = scheduler(config().with_max_ticks(1), generator);
        sched.startup(Swarmling::seed).unwrap();
        let summary = sched.run().unwrap();
        assert!(!summary.generator_joined);
        assert_eq!(summary.persists, 1);
    }

    #[test]
    fn restored_regions_are_never_requested() {
        let home = RegionCoord::new(0, 0);
        let corner = RegionCoord::new(1, 1);
        let mut stale = open_room(home);
        stale.place_occupant(EntityId::new(), TileCoord::new(1, 1));
        let saved = WorldSnapshot::new(40, vec![(home, stale), (corner, open_room(corner))]);

        let config = config().with_initial_population(0);
        let mut sched = scheduler(config, ScriptedGenerator::auto());
        assert_eq!(sched.restore(saved), 2);
        sched.startup(Swarmling::seed).unwrap();

        assert_eq!(sched.generator().requests.len(), 2);
        assert_eq!(sched.generator().requests_for(home), 0);
        assert_eq!(sched.generator().requests_for(corner), 0);
        assert_eq!(sched.world().resident_count(), 4);
        assert!(sched.world().get(home).unwrap().occupants.is_empty());
    }

    #[test]
    fn serial_and_parallel_runs_agree() {
        let run = |mode| {
            let mut sched = scheduler(
                config()
                    .with_initial_population(30)
                    .with_execution(mode)
                    .with_max_ticks(40),
                ScriptedGenerator::auto(),
            );
            sched.startup(Swarmling::seed).unwrap();
            let summary = sched.run().unwrap();
            (summary.ticks, summary.population, summary.resident_regions)
        };
        assert_eq!(run(ExecutionMode::Serial), run(ExecutionMode::Parallel));
    }
}
