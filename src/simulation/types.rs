//! Core types for the car simulation
//!
//! Identifiers, tile directions and the tunables that drive car behavior.

use std::fmt;

use super::vector::{TileCoord, Vector2D};

/// A unique identifier for a car, also its index in the world's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarId(pub usize);

impl CarId {
    /// Single character drawn for this car
    pub fn display_char(&self) -> char {
        const GLYPHS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
        GLYPHS.get(self.0).map(|&glyph| glyph as char).unwrap_or('#')
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_char())
    }
}

/// What a tile tells the car standing on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    /// Crossing tile, carries no direction of its own
    Intersection,
    /// Off-road
    Empty,
}

impl Direction {
    /// Compass directions in clockwise order, starting at `Up`
    pub const COMPASS: [Direction; 8] = [
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
    ];

    /// Parse a track authoring character
    pub fn from_char(ch: char) -> Option<Direction> {
        let direction = match ch {
            'U' => Direction::Up,
            'E' => Direction::UpRight,
            'D' => Direction::Right,
            'C' => Direction::DownRight,
            'X' => Direction::Down,
            'Z' => Direction::DownLeft,
            'A' => Direction::Left,
            'Q' => Direction::UpLeft,
            '*' => Direction::Intersection,
            ' ' => Direction::Empty,
            _ => return None,
        };
        Some(direction)
    }

    /// The track authoring character for this direction
    pub fn to_char(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::UpRight => 'E',
            Direction::Right => 'D',
            Direction::DownRight => 'C',
            Direction::Down => 'X',
            Direction::DownLeft => 'Z',
            Direction::Left => 'A',
            Direction::UpLeft => 'Q',
            Direction::Intersection => '*',
            Direction::Empty => ' ',
        }
    }

    /// True for the 8 compass directions
    pub fn is_road(self) -> bool {
        !matches!(self, Direction::Intersection | Direction::Empty)
    }

    /// Offset to the neighbouring tile this direction points at
    pub fn offset(self) -> TileCoord {
        match self {
            Direction::Up => TileCoord::new(0, -1),
            Direction::UpRight => TileCoord::new(1, -1),
            Direction::Right => TileCoord::new(1, 0),
            Direction::DownRight => TileCoord::new(1, 1),
            Direction::Down => TileCoord::new(0, 1),
            Direction::DownLeft => TileCoord::new(-1, 1),
            Direction::Left => TileCoord::new(-1, 0),
            Direction::UpLeft => TileCoord::new(-1, -1),
            Direction::Intersection | Direction::Empty => TileCoord::new(0, 0),
        }
    }

    /// Unit heading, zero for intersection and empty tiles
    pub fn heading(self) -> Vector2D {
        Vector2D::from(self.offset()).normalize()
    }

    /// The compass direction `steps` eighth-turns away, clockwise for positive steps
    ///
    /// Intersection and empty tiles have nothing to rotate and map to themselves.
    pub fn rotated(self, steps: i32) -> Direction {
        match Direction::COMPASS.iter().position(|&d| d == self) {
            Some(index) => Direction::COMPASS[(index as i32 + steps).rem_euclid(8) as usize],
            None => self,
        }
    }
}

/// Inclusive range a per-car parameter is clamped into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Radius of a car used for collision checks, in tiles
pub const CAR_COLLISION_RADIUS: f32 = 0.25;

/// Gap cars try to keep beyond touching each other
pub const SAFE_DISTANCE: f32 = 0.1;

/// How far past its next position a car checks for other cars
pub const COLLISION_PROBE_MARGIN: f32 = 0.05;

/// Widest turn a car accepts toward its next target point
pub const MAX_STEERING_ANGLE_DEGREES: f32 = 45.0;

/// Float slack on the steering limit so exact 45 degree joins still pass
pub const STEERING_ANGLE_TOLERANCE_DEGREES: f32 = 0.01;

/// Tiles searched ahead for a target point before the track is declared malformed
pub const HEADING_SEARCH_STEP_CAP: usize = 100;

/// Decimal digits kept when comparing distances between cars
pub const DISTANCE_PRECISION_DIGITS: i32 = 4;

/// Slow-down attempts before a car gives up and stops
pub const SLOW_DOWN_ITERATION_CAP: usize = 32;

/// Smallest speed reduction per slow-down attempt
pub const SLOW_DOWN_MIN_STEP: f32 = 0.01;

/// Tiles looked ahead for an intersection before stopping at a red light
pub const INTERSECTION_LOOKAHEAD_TILES: i32 = 2;

/// Tiles a lane change looks ahead from its landing point for a way back onto the lane
pub const LANE_CHANGE_LOOKAHEAD_TILES: usize = 2;

/// Spawn point draws before giving up on finding a free tile
pub const SPAWN_RETRY_BUDGET: usize = 1000;

pub const ACCELERATION_BOUNDS: Bounds = Bounds::new(0.1, 1.0);
pub const MAX_SPEED_BOUNDS: Bounds = Bounds::new(0.25, 1.0);

/// Tunables shared by every car of a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct DrivingRules {
    pub collision_radius: f32,
    pub safe_distance: f32,
    pub probe_margin: f32,
    pub max_steering_angle: f32,
    pub heading_step_cap: usize,
    pub distance_precision_digits: i32,
    pub slow_down_iteration_cap: usize,
    pub acceleration_bounds: Bounds,
    pub max_speed_bounds: Bounds,
    /// Let blocked cars move into a parallel lane
    pub lane_change: bool,
    /// Steer cars that left the road toward the map center instead of parking them
    pub off_track_recovery: bool,
}

impl Default for DrivingRules {
    fn default() -> Self {
        Self {
            collision_radius: CAR_COLLISION_RADIUS,
            safe_distance: SAFE_DISTANCE,
            probe_margin: COLLISION_PROBE_MARGIN,
            max_steering_angle: MAX_STEERING_ANGLE_DEGREES,
            heading_step_cap: HEADING_SEARCH_STEP_CAP,
            distance_precision_digits: DISTANCE_PRECISION_DIGITS,
            slow_down_iteration_cap: SLOW_DOWN_ITERATION_CAP,
            acceleration_bounds: ACCELERATION_BOUNDS,
            max_speed_bounds: MAX_SPEED_BOUNDS,
            lane_change: false,
            off_track_recovery: false,
        }
    }
}

impl DrivingRules {
    /// Round a distance to the configured number of decimal digits
    pub fn round_distance(&self, distance: f32) -> f32 {
        let scale = 10f32.powi(self.distance_precision_digits);
        (distance * scale).round() / scale
    }
}
