//! Standalone car simulation module
//!
//! Cars drive over a directed tile grid, keep their distance from each other
//! and wait at synchronized traffic lights. The module has no rendering or
//! terminal dependencies.

mod car;
mod error;
mod layouts;
mod threaded;
mod track;
mod traffic_light;
mod types;
mod vector;
mod world;

pub use car::{Car, CarSlot, CarUpdateResult};
pub use error::{SimError, SimResult};
pub use layouts::{load_track_file, Layout, FIGURE_EIGHT, OVAL};
pub use threaded::{run_threaded, RunStats, ThreadedConfig, RENDER_PERIOD_MS, UPDATE_PERIOD_MS};
pub use track::Track;
pub use traffic_light::{
    signal_group, wall_clock, TrafficLights, LIGHT_PHASE_COUNT, LIGHT_SWITCH_INTERVAL_SECS,
};
pub use types::{
    Bounds, CarId, Direction, DrivingRules, ACCELERATION_BOUNDS, CAR_COLLISION_RADIUS,
    COLLISION_PROBE_MARGIN, DISTANCE_PRECISION_DIGITS, HEADING_SEARCH_STEP_CAP,
    MAX_SPEED_BOUNDS, MAX_STEERING_ANGLE_DEGREES, SAFE_DISTANCE, SLOW_DOWN_ITERATION_CAP,
    SPAWN_RETRY_BUDGET,
};
pub use vector::{TileCoord, Vector2D};
pub use world::{step_car, SimWorld};
