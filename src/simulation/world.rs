//! Main simulation world that ties everything together
//!
//! The world owns the cars and the shared track. Cars live in an arena
//! indexed by their id; the track only keeps weak handles to them.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::car::{Car, CarSlot, CarUpdateResult};
use super::error::SimResult;
use super::track::Track;
use super::traffic_light::TrafficLights;
use super::types::{Bounds, CarId, DrivingRules};
use super::vector::Vector2D;

/// The main simulation world
pub struct SimWorld {
    /// Track shared with every car
    pub track: Arc<Track>,

    /// All cars, index == id
    cars: Vec<CarSlot>,

    pub rules: DrivingRules,

    pub lights: TrafficLights,

    /// Number of single-threaded ticks run so far
    pub ticks: u64,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl SimWorld {
    fn new_internal(track: Track, rules: DrivingRules, lights: TrafficLights, rng: Option<StdRng>) -> Self {
        Self {
            track: Arc::new(track),
            cars: Vec::new(),
            rules,
            lights,
            ticks: 0,
            rng,
        }
    }

    pub fn new(track: Track, rules: DrivingRules, lights: TrafficLights) -> Self {
        Self::new_internal(track, rules, lights, None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(track: Track, rules: DrivingRules, lights: TrafficLights, seed: u64) -> Self {
        Self::new_internal(track, rules, lights, Some(StdRng::seed_from_u64(seed)))
    }

    /// Get a random value in the given bounds, using seeded RNG if available
    fn random_in(&mut self, bounds: Bounds) -> f32 {
        if bounds.min >= bounds.max {
            return bounds.min;
        }
        match &mut self.rng {
            Some(rng) => rng.random_range(bounds.min..=bounds.max),
            None => rand::rng().random_range(bounds.min..=bounds.max),
        }
    }

    fn random_spawn_point(&mut self) -> SimResult<Vector2D> {
        let track = Arc::clone(&self.track);
        let is_free = |point: Vector2D| {
            let tile = Track::map_to_tile(point);
            track
                .cars_on_track()
                .iter()
                .all(|car| Track::map_to_tile(car.position()) != tile)
        };
        match &mut self.rng {
            Some(rng) => track.spawn_point(rng, is_free),
            None => track.spawn_point(&mut rand::rng(), is_free),
        }
    }

    /// Spawn a car on a free road tile
    ///
    /// Missing speed parameters are drawn uniformly from the rule bounds.
    pub fn spawn_car(&mut self, max_speed: Option<f32>, acceleration: Option<f32>) -> Result<CarId> {
        let position = self
            .random_spawn_point()
            .context("Failed to find a spawn point")?;
        let (speed_bounds, acceleration_bounds) =
            (self.rules.max_speed_bounds, self.rules.acceleration_bounds);
        let max_speed = match max_speed {
            Some(value) => value,
            None => self.random_in(speed_bounds),
        };
        let acceleration = match acceleration {
            Some(value) => value,
            None => self.random_in(acceleration_bounds),
        };
        Ok(self.add_car_at(position, max_speed, acceleration))
    }

    /// Spawn `count` cars with random parameters
    pub fn spawn_cars(&mut self, count: usize) -> Result<Vec<CarId>> {
        (0..count)
            .map(|index| {
                self.spawn_car(None, None)
                    .with_context(|| format!("Failed to spawn car {} of {}", index + 1, count))
            })
            .collect()
    }

    /// Place a car at an explicit position and register it on the track
    pub fn add_car_at(&mut self, position: Vector2D, max_speed: f32, acceleration: f32) -> CarId {
        let id = CarId(self.cars.len());
        let car = Car::new(id, position, max_speed, acceleration, &self.track, &self.rules);
        info!(
            "Car {} spawned at {} maxspeed: {:.2} acceleration: {:.2}",
            id,
            position,
            car.max_speed(),
            car.acceleration()
        );

        let slot = Arc::new(RwLock::new(car));
        self.track.register_car(Arc::downgrade(&slot));
        self.cars.push(slot);
        id
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub fn car(&self, id: CarId) -> Option<Car> {
        self.cars
            .get(id.0)
            .map(|slot| *slot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy of every car, in id order
    pub fn snapshot(&self) -> Vec<Car> {
        self.cars
            .iter()
            .map(|slot| *slot.read().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }

    /// Shared handles to the car slots, in id order
    pub fn slots(&self) -> &[CarSlot] {
        &self.cars
    }

    /// Update every car once, in ascending id order
    ///
    /// Each car sees the cars before it already moved this tick.
    pub fn tick(&mut self, now: Duration) -> Result<Vec<(CarId, CarUpdateResult)>> {
        self.ticks += 1;
        self.cars
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                let result = step_car(slot, &self.track, &self.rules, &self.lights, now)?;
                Ok((CarId(index), result))
            })
            .collect()
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Car Simulation Summary ===");
        println!("Ticks: {}", self.ticks);
        println!(
            "Track: {}x{}, road tiles: {}",
            self.track.width(),
            self.track.height(),
            self.track.road_tile_count()
        );
        println!("Cars: {}", self.cars.len());
        for car in self.snapshot() {
            println!(
                "  Car {}: position={} speed={:.2}/{:.2} direction={:?}",
                car.id(),
                car.position(),
                car.speed(),
                car.max_speed(),
                car.last_direction()
            );
        }
    }
}

/// Run one update of the car in `slot` and publish the result
///
/// The next state is computed from a copy, so the write lock is only held to
/// store it and other cars can read the slot meanwhile.
pub fn step_car(
    slot: &CarSlot,
    track: &Track,
    rules: &DrivingRules,
    lights: &TrafficLights,
    now: Duration,
) -> Result<CarUpdateResult> {
    let current = *slot.read().unwrap_or_else(PoisonError::into_inner);
    let (next, result) = current
        .next_state(track, rules, lights, now)
        .with_context(|| format!("Car {} failed to update", current.id()))?;
    *slot.write().unwrap_or_else(PoisonError::into_inner) = next;
    Ok(result)
}
