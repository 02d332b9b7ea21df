use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use sw_core::RegionCoord;
use sw_simulation::{Fulfillment, HaltSignal, RecvOutcome, RegionGenerator, SimResult};
use tracing::{debug, warn};

use crate::error::WorldgenError;
use crate::synth::RoomSynth;

const JOIN_POLL: Duration = Duration::from_millis(5);

#[derive(Debug)]
enum GenCommand {
    Generate(RegionCoord),
    Halt,
}

/// Runs a [`RoomSynth`] on its own thread.
///
/// Requests made before [`RegionGenerator::start`] are queued and sent once
/// the thread is up. After [`RegionGenerator::halt`] the worker finishes the
/// region it is working on and drops everything still queued.
pub struct GeneratorWorker<S> {
    synth: Option<S>,
    latency: Duration,
    stop: HaltSignal,
    commands: Option<mpsc::Sender<GenCommand>>,
    output: Option<mpsc::Receiver<Fulfillment>>,
    handle: Option<thread::JoinHandle<()>>,
    queued: Vec<RegionCoord>,
}

impl<S> std::fmt::Debug for GeneratorWorker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorWorker")
            .field("running", &self.handle.is_some())
            .field("latency", &self.latency)
            .field("queued", &self.queued.len())
            .finish()
    }
}

impl<S: RoomSynth> GeneratorWorker<S> {
    /// A stopped worker around `synth`.
    pub fn new(synth: S) -> Self {
        Self {
            synth: Some(synth),
            latency: Duration::ZERO,
            stop: HaltSignal::new(),
            commands: None,
            output: None,
            handle: None,
            queued: Vec::new(),
        }
    }

    /// Sleep this long before producing each region.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn spawn(&mut self) -> Result<(), WorldgenError> {
        let mut synth = self.synth.take().ok_or(WorldgenError::AlreadyStarted)?;
        let (command_tx, command_rx) = mpsc::channel::<GenCommand>();
        let (output_tx, output_rx) = mpsc::channel::<Fulfillment>();
        let stop = self.stop.clone();
        let latency = self.latency;

        let handle = thread::Builder::new()
            .name("sw-worldgen".into())
            .spawn(move || {
                let mut produced = 0u64;
                while let Ok(command) = command_rx.recv() {
                    if stop.is_halted() {
                        break;
                    }
                    match command {
                        GenCommand::Generate(coord) => {
                            if !latency.is_zero() {
                                thread::sleep(latency);
                            }
                            let content = synth.synthesize(coord);
                            if output_tx.send(Fulfillment::new(coord, content)).is_err() {
                                break;
                            }
                            produced += 1;
                        }
                        GenCommand::Halt => break,
                    }
                }
                debug!(produced, "generator worker stopped");
            })?;

        for coord in self.queued.drain(..) {
            let _ = command_tx.send(GenCommand::Generate(coord));
        }
        self.commands = Some(command_tx);
        self.output = Some(output_rx);
        self.handle = Some(handle);
        Ok(())
    }
}

impl<S: RoomSynth> RegionGenerator for GeneratorWorker<S> {
    fn start(&mut self) -> SimResult<()> {
        self.spawn()?;
        debug!("generator worker started");
        Ok(())
    }

    fn request(&mut self, coord: RegionCoord) {
        match &self.commands {
            Some(tx) => {
                if tx.send(GenCommand::Generate(coord)).is_err() {
                    debug!(%coord, "generator gone; request dropped");
                }
            }
            None => self.queued.push(coord),
        }
    }

    fn try_recv(&mut self) -> Option<Fulfillment> {
        self.output.as_ref()?.try_recv().ok()
    }

    fn recv_blocking(&mut self, timeout: Option<Duration>) -> RecvOutcome {
        let Some(rx) = &self.output else {
            return RecvOutcome::Disconnected;
        };
        match timeout {
            None => rx
                .recv()
                .map_or(RecvOutcome::Disconnected, RecvOutcome::Ready),
            Some(timeout) => match rx.recv_timeout(timeout) {
                Ok(fulfillment) => RecvOutcome::Ready(fulfillment),
                Err(RecvTimeoutError::Timeout) => RecvOutcome::TimedOut,
                Err(RecvTimeoutError::Disconnected) => RecvOutcome::Disconnected,
            },
        }
    }

    fn halt(&mut self) {
        self.stop.trigger();
        if let Some(tx) = &self.commands {
            let _ = tx.send(GenCommand::Halt);
        }
    }

    fn join(&mut self, timeout: Duration) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };
        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                self.handle = Some(handle);
                return false;
            }
            thread::sleep(JOIN_POLL);
        }
        if handle.join().is_err() {
            warn!("generator worker panicked");
        }
        true
    }
}

impl<S> Drop for GeneratorWorker<S> {
    fn drop(&mut self) {
        // Let a still-running thread wind down on its own.
        self.stop.trigger();
        if let Some(tx) = &self.commands {
            let _ = tx.send(GenCommand::Halt);
        }
    }
}
