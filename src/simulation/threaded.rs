//! Multi-threaded scheduler
//!
//! Every car runs its own update loop on a dedicated thread at a fixed
//! period, while the calling thread renders snapshots at its own period.
//! A car slot is only written by its own thread; everybody else copies it
//! under a read lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use log::{error, info};

use super::car::{Car, CarSlot};
use super::track::Track;
use super::traffic_light::{wall_clock, TrafficLights};
use super::types::DrivingRules;
use super::world::{step_car, SimWorld};

/// Default time between two updates of the same car
pub const UPDATE_PERIOD_MS: u64 = 100;

/// Default time between two rendered frames
pub const RENDER_PERIOD_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadedConfig {
    pub update_period: Duration,
    pub render_period: Duration,
    /// Stop after this long; run until the process ends when unset
    pub run_for: Option<Duration>,
}

impl Default for ThreadedConfig {
    fn default() -> Self {
        Self {
            update_period: Duration::from_millis(UPDATE_PERIOD_MS),
            render_period: Duration::from_millis(RENDER_PERIOD_MS),
            run_for: None,
        }
    }
}

/// Counters collected once a threaded run ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub car_updates: u64,
    pub frames: u64,
}

/// Run every car on its own thread and call `on_frame` at the render period
///
/// Returns when `run_for` elapses or a car thread fails. A failing car stops
/// the whole run and its error is returned.
pub fn run_threaded<F>(world: &SimWorld, config: &ThreadedConfig, mut on_frame: F) -> Result<RunStats>
where
    F: FnMut(&Track, &[Car]),
{
    let running = Arc::new(AtomicBool::new(true));
    let rules = Arc::new(world.rules.clone());

    let mut handles = Vec::with_capacity(world.car_count());
    for (index, slot) in world.slots().iter().enumerate() {
        let worker = CarWorker {
            slot: Arc::clone(slot),
            track: Arc::clone(&world.track),
            rules: Arc::clone(&rules),
            lights: world.lights,
            running: Arc::clone(&running),
            period: config.update_period,
        };
        let handle = thread::Builder::new()
            .name(format!("car-{}", index))
            .spawn(move || worker.run());
        match handle {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                running.store(false, Ordering::Relaxed);
                join_all(handles)?;
                return Err(err).context("Failed to start car thread");
            }
        }
    }
    info!("Started {} car threads", handles.len());

    let started = Instant::now();
    let mut frames = 0;
    loop {
        let frame_start = Instant::now();
        if config.run_for.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
        // Car loops only return early when they fail
        if handles.iter().any(JoinHandle::is_finished) {
            break;
        }

        on_frame(&world.track, &world.snapshot());
        frames += 1;
        sleep_remaining(frame_start, config.render_period);
    }

    running.store(false, Ordering::Relaxed);
    let car_updates = join_all(handles)?;
    info!("Threaded run finished: {} car updates, {} frames", car_updates, frames);
    Ok(RunStats { car_updates, frames })
}

/// Everything a car thread needs to drive on its own
struct CarWorker {
    slot: CarSlot,
    track: Arc<Track>,
    rules: Arc<DrivingRules>,
    lights: TrafficLights,
    running: Arc<AtomicBool>,
    period: Duration,
}

impl CarWorker {
    /// Update the car every period until the run stops, returning the update count
    fn run(self) -> Result<u64> {
        let mut updates = 0;
        while self.running.load(Ordering::Relaxed) {
            let tick_start = Instant::now();
            step_car(&self.slot, &self.track, &self.rules, &self.lights, wall_clock())?;
            updates += 1;
            sleep_remaining(tick_start, self.period);
        }
        Ok(updates)
    }
}

/// Sleep for what is left of `period` since `start`
fn sleep_remaining(start: Instant, period: Duration) {
    if let Some(rest) = period.checked_sub(start.elapsed()) {
        thread::sleep(rest);
    }
}

/// Join every car thread, returning the first failure
fn join_all(handles: Vec<JoinHandle<Result<u64>>>) -> Result<u64> {
    let mut updates = 0;
    let mut first_error = None;
    for handle in handles {
        let name = handle.thread().name().unwrap_or("car").to_string();
        match handle.join() {
            Ok(Ok(count)) => updates += count,
            Ok(Err(err)) => {
                error!("Thread {} stopped: {:#}", name, err);
                first_error.get_or_insert(err);
            }
            Err(_) => {
                error!("Thread {} panicked", name);
                first_error.get_or_insert(anyhow!("Thread {} panicked", name));
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(updates),
    }
}
