//! Car movement logic for the car simulation
//!
//! A car steers toward target points derived from the tile chain ahead of
//! it, stops before red lights and slows down or changes lane to keep its
//! distance from the other cars on the track.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, warn};
use ordered_float::OrderedFloat;

use super::error::{SimError, SimResult};
use super::track::Track;
use super::traffic_light::TrafficLights;
use super::types::{
    CarId, Direction, DrivingRules, INTERSECTION_LOOKAHEAD_TILES, LANE_CHANGE_LOOKAHEAD_TILES,
    SLOW_DOWN_MIN_STEP, STEERING_ANGLE_TOLERANCE_DEGREES,
};
use super::vector::{TileCoord, Vector2D};

/// Shared handle to a car: written by its owner, read by everyone else
pub type CarSlot = Arc<RwLock<Car>>;

/// What a car ended up doing during an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarUpdateResult {
    /// Following the road without interference
    Cruising,
    /// Waiting in front of an intersection with a red light
    StoppedAtRed,
    /// Slowed down, possibly to a stop, to keep its distance
    AvoidingCollision,
    /// Moving into a parallel lane to get around a car
    LaneChanging,
    /// Left the road graph
    OffTrack,
}

/// A car in the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Car {
    id: CarId,
    position: Vector2D,
    /// Unit vector of where the car is heading
    forward: Vector2D,
    speed: f32,
    max_speed: f32,
    /// Speed gained per tick, as a fraction of `max_speed`
    acceleration: f32,
    /// Last non-intersection tile direction the car followed
    last_direction: Direction,
}

impl Car {
    /// Place a car at `position`, facing the direction of the tile under it
    ///
    /// `max_speed` and `acceleration` are clamped into the bounds of `rules`.
    pub fn new(
        id: CarId,
        position: Vector2D,
        max_speed: f32,
        acceleration: f32,
        track: &Track,
        rules: &DrivingRules,
    ) -> Self {
        let direction = track.direction_at(position);
        Self {
            id,
            position,
            forward: direction.heading(),
            speed: 0.0,
            max_speed: rules.max_speed_bounds.clamp(max_speed),
            acceleration: rules.acceleration_bounds.clamp(acceleration),
            last_direction: direction,
        }
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn position(&self) -> Vector2D {
        self.position
    }

    pub fn forward(&self) -> Vector2D {
        self.forward
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    pub fn display_char(&self) -> char {
        self.id.display_char()
    }

    /// Whether `point` lies inside the car's collision circle
    pub fn covers(&self, point: Vector2D, radius: f32) -> bool {
        self.position.distance(&point) < radius
    }

    /// Advance the car by one tick
    pub fn update(
        &mut self,
        track: &Track,
        rules: &DrivingRules,
        lights: &TrafficLights,
        now: Duration,
    ) -> SimResult<CarUpdateResult> {
        let (next, result) = self.next_state(track, rules, lights, now)?;
        *self = next;
        Ok(result)
    }

    /// Compute the car's state after one tick without touching the car itself
    ///
    /// `now` is the time since the Unix epoch and drives the traffic lights.
    pub fn next_state(
        &self,
        track: &Track,
        rules: &DrivingRules,
        lights: &TrafficLights,
        now: Duration,
    ) -> SimResult<(Car, CarUpdateResult)> {
        let tile = Track::map_to_tile(self.position);
        let tile_direction = track.tile_at(tile);

        // Stop instantly in front of a red light
        if self.is_red_light_ahead(track, lights, tile, tile_direction, now)? {
            let mut stopped = *self;
            stopped.speed = 0.0;
            return Ok((stopped, CarUpdateResult::StoppedAtRed));
        }

        let mut speed = self
            .max_speed
            .min(self.speed + self.acceleration * self.max_speed);

        let mut result = CarUpdateResult::Cruising;
        let mut heading = match self.find_next_direction(track, rules, tile, tile_direction, speed)? {
            Some(heading) => heading,
            None => {
                result = CarUpdateResult::OffTrack;
                if rules.off_track_recovery {
                    debug!("Car {} is off track, steering to the map center", self.id);
                    (track.center() - self.position).normalize()
                } else {
                    if self.speed > 0.0 {
                        warn!("Car {} left the road at {}", self.id, self.position);
                    }
                    Vector2D::ZERO
                }
            }
        };

        if !heading.is_zero() {
            let others = track.cars_on_track();
            if let Some(overlap) = self.probe_collision(&others, heading, speed, rules) {
                let lane = if rules.lane_change {
                    self.find_lane_change(track, rules, &others, tile, tile_direction, speed)
                } else {
                    None
                };

                match lane {
                    Some(lane_heading) => {
                        debug!("Car {} changes lane at {}", self.id, self.position);
                        heading = lane_heading;
                        result = CarUpdateResult::LaneChanging;
                    }
                    None => {
                        speed = self.slow_down(&others, heading, speed, overlap, rules);
                        debug!("Car {} slows down to {:.3}", self.id, speed);
                        result = CarUpdateResult::AvoidingCollision;
                    }
                }
            }
        }

        let mut next = *self;
        if heading.is_zero() {
            next.speed = 0.0;
        } else {
            next.position += heading * speed;
            next.forward = heading;
            next.speed = speed;
        }

        // Intersections and empty tiles carry no direction to remember
        let new_direction = track.direction_at(next.position);
        if new_direction.is_road() {
            next.last_direction = new_direction;
        }

        Ok((next, result))
    }

    /// Whether an intersection two tiles ahead has a red light for this car
    fn is_red_light_ahead(
        &self,
        track: &Track,
        lights: &TrafficLights,
        tile: TileCoord,
        tile_direction: Direction,
        now: Duration,
    ) -> SimResult<bool> {
        // Already crossing, keep going
        if tile_direction == Direction::Intersection {
            return Ok(false);
        }

        // One tile ahead is too late: the stopped car would block the crossing
        let ahead = tile + self.last_direction.offset() * INTERSECTION_LOOKAHEAD_TILES;
        if track.tile_at(ahead) != Direction::Intersection {
            return Ok(false);
        }

        lights.is_red(self.last_direction, now)
    }

    /// Unit heading toward the next target point along the road
    ///
    /// Walks the tile chain from the car's tile. The target point of a tile
    /// is its center pushed half a tile along its direction, where it joins
    /// the next tile. The first target within the steering limit and at least
    /// half of the current speed away wins.
    ///
    /// When no target qualifies, the car may turn at the steering limit toward
    /// the first target it could reach by turning up to twice as far, as long
    /// as moving `speed` that way keeps it on the road. Returns `None` when
    /// the car has nowhere on the road to go.
    fn find_next_direction(
        &self,
        track: &Track,
        rules: &DrivingRules,
        tile: TileCoord,
        tile_direction: Direction,
        speed: f32,
    ) -> SimResult<Option<Vector2D>> {
        let walk_direction = match tile_direction {
            Direction::Intersection => self.last_direction,
            direction => direction,
        };
        if !walk_direction.is_road() {
            return Ok(None);
        }

        let walk = walk_chain(
            track,
            rules,
            self.position,
            self.forward,
            tile,
            walk_direction,
            self.speed / 2.0,
            rules.heading_step_cap,
        );
        let exhausted = match walk.end {
            WalkEnd::Target(heading, _) => return Ok(Some(heading)),
            WalkEnd::Empty => false,
            WalkEnd::StepCap => true,
        };

        if let Some(near_miss) = walk.near_miss {
            let turn = self.steer_toward(near_miss, rules.max_steering_angle);
            if track.direction_at(self.position + turn * speed) == Direction::Empty {
                return Ok(None);
            }
            debug!("Car {} turns at full lock at {}", self.id, self.position);
            return Ok(Some(turn));
        }

        if exhausted {
            return Err(SimError::HeadingSearchExhausted {
                car: self.id,
                steps: rules.heading_step_cap,
            });
        }
        Ok(None)
    }

    /// Forward vector turned by `degrees` toward `target_direction`
    fn steer_toward(&self, target_direction: Vector2D, degrees: f32) -> Vector2D {
        // Positive cross product means the target is clockwise on screen
        let cross = self.forward.x * target_direction.y - self.forward.y * target_direction.x;
        let turn = if cross >= 0.0 { degrees } else { -degrees };
        self.forward.rotate(turn).normalize()
    }

    /// Overlap with the closest car if moving `speed` along `heading` is unsafe
    ///
    /// The probe looks a margin past the next position. The distance is rounded
    /// before subtracting, otherwise two nearly equal values can leave a tiny
    /// negative slack and report a collision that isn't there.
    fn probe_collision(
        &self,
        others: &[Car],
        heading: Vector2D,
        speed: f32,
        rules: &DrivingRules,
    ) -> Option<f32> {
        let probe = self.position + heading * (speed + rules.probe_margin);

        let closest = others
            .iter()
            .filter(|other| other.id != self.id)
            .map(|other| other.position.distance(&probe))
            .min_by_key(|&distance| OrderedFloat(distance))?;

        let extra = rules.round_distance(closest)
            - rules.collision_radius * 2.0
            - rules.safe_distance;
        (extra < 0.0).then_some(-extra)
    }

    /// Heading into a parallel lane, if one is free
    ///
    /// Tries the tiles 45 degrees to either side of the road direction. A
    /// candidate must continue in the same direction and be collision free at
    /// `speed`. The move must also keep the car on the road somewhere it can
    /// steer back along the lane from.
    fn find_lane_change(
        &self,
        track: &Track,
        rules: &DrivingRules,
        others: &[Car],
        tile: TileCoord,
        tile_direction: Direction,
        speed: f32,
    ) -> Option<Vector2D> {
        if !tile_direction.is_road() {
            return None;
        }

        [1, -1].into_iter().find_map(|steps| {
            let lane_tile = tile + tile_direction.rotated(steps).offset();
            if track.tile_at(lane_tile) != tile_direction {
                return None;
            }

            let heading = (lane_tile.center() - self.position).normalize();
            if heading.is_zero() || !self.can_rejoin_road(track, rules, heading, speed) {
                return None;
            }

            match self.probe_collision(others, heading, speed, rules) {
                Some(_) => None,
                None => Some(heading),
            }
        })
    }

    /// Whether moving `speed` along `heading` lands on the road facing a
    /// target the car can reach on the next tick
    ///
    /// That target also has to lie within the steering limit of its own
    /// tile direction, so the car ends up following the lane instead of
    /// cutting across it.
    fn can_rejoin_road(
        &self,
        track: &Track,
        rules: &DrivingRules,
        heading: Vector2D,
        speed: f32,
    ) -> bool {
        let landing = self.position + heading * speed;
        let direction = match track.direction_at(landing) {
            Direction::Empty => return false,
            Direction::Intersection => self.last_direction,
            direction => direction,
        };
        if !direction.is_road() {
            return false;
        }

        let walk = walk_chain(
            track,
            rules,
            landing,
            heading,
            Track::map_to_tile(landing),
            direction,
            speed / 2.0,
            LANE_CHANGE_LOOKAHEAD_TILES,
        );
        let max_angle = rules.max_steering_angle + STEERING_ANGLE_TOLERANCE_DEGREES;
        match walk.end {
            WalkEnd::Target(next_heading, target_direction) => {
                next_heading.angle_between(&target_direction.heading()) < max_angle
            }
            WalkEnd::Empty | WalkEnd::StepCap => false,
        }
    }

    /// Highest speed below `speed` that clears every car, zero if none does
    fn slow_down(
        &self,
        others: &[Car],
        heading: Vector2D,
        speed: f32,
        overlap: f32,
        rules: &DrivingRules,
    ) -> f32 {
        let mut candidate = speed;
        let mut overlap = overlap;
        for _ in 0..rules.slow_down_iteration_cap {
            candidate = (candidate - overlap.max(SLOW_DOWN_MIN_STEP)).max(0.0);
            if candidate == 0.0 {
                return 0.0;
            }
            match self.probe_collision(others, heading, candidate, rules) {
                Some(remaining) => overlap = remaining,
                None => return candidate,
            }
        }
        0.0
    }
}

/// How a walk along the tile chain ended
enum WalkEnd {
    /// Unit heading toward the accepted target and the direction of its tile
    Target(Vector2D, Direction),
    /// The chain ran into a tile off the road
    Empty,
    /// No target within the step budget
    StepCap,
}

struct ChainWalk {
    end: WalkEnd,
    /// First target rejected only for needing up to twice the steering limit
    near_miss: Option<Vector2D>,
}

/// Follow the tile chain from `tile`, looking for a target point seen from
/// `position` facing `forward`
///
/// Targets closer than `min_distance` are skipped.
#[allow(clippy::too_many_arguments)]
fn walk_chain(
    track: &Track,
    rules: &DrivingRules,
    position: Vector2D,
    forward: Vector2D,
    mut tile: TileCoord,
    mut direction: Direction,
    min_distance: f32,
    steps: usize,
) -> ChainWalk {
    let max_angle = rules.max_steering_angle + STEERING_ANGLE_TOLERANCE_DEGREES;
    let mut near_miss = None;
    for _ in 0..steps {
        let target = tile.center() + Vector2D::from(direction.offset()) * 0.5;
        let to_target = target - position;
        let distance = to_target.length();

        if distance > 0.0 && distance >= min_distance {
            let angle = to_target.angle_between(&forward);
            if angle < max_angle {
                return ChainWalk {
                    end: WalkEnd::Target(to_target.normalize(), direction),
                    near_miss,
                };
            }
            if near_miss.is_none() && angle < max_angle * 2.0 {
                near_miss = Some(to_target);
            }
        }

        tile += direction.offset();
        direction = match track.tile_at(tile) {
            Direction::Empty => {
                return ChainWalk {
                    end: WalkEnd::Empty,
                    near_miss,
                }
            }
            Direction::Intersection => direction,
            next => next,
        };
    }
    ChainWalk {
        end: WalkEnd::StepCap,
        near_miss,
    }
}
