//! Traffic lights shared by every intersection
//!
//! All intersections follow one clock. The light state only depends on the
//! time handed in, so every car sees the same lights without talking to
//! each other.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::error::{SimError, SimResult};
use super::types::Direction;

/// Seconds each phase lasts unless configured otherwise
pub const LIGHT_SWITCH_INTERVAL_SECS: u64 = 5;

/// Number of phases in one light cycle
pub const LIGHT_PHASE_COUNT: u64 = 4;

const SECONDS_PER_MINUTE: u64 = 60;

/// Current wall-clock time as used by the traffic lights
pub fn wall_clock() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLights {
    switch_interval_secs: u64,
}

impl Default for TrafficLights {
    fn default() -> Self {
        Self::new(LIGHT_SWITCH_INTERVAL_SECS)
    }
}

impl TrafficLights {
    /// Lights switching every `switch_interval_secs` seconds (at least one)
    pub fn new(switch_interval_secs: u64) -> Self {
        Self {
            switch_interval_secs: switch_interval_secs.max(1),
        }
    }

    pub fn switch_interval_secs(&self) -> u64 {
        self.switch_interval_secs
    }

    /// Length of a full cycle through every phase
    pub fn cycle(&self) -> Duration {
        Duration::from_secs(self.switch_interval_secs * LIGHT_PHASE_COUNT)
    }

    /// Phase index at `now`, measured from the Unix epoch
    pub fn phase(&self, now: Duration) -> u64 {
        let second_in_minute = now.as_secs() % SECONDS_PER_MINUTE;
        (second_in_minute / self.switch_interval_secs) % LIGHT_PHASE_COUNT
    }

    /// Whether a car approaching in `direction` must wait at `now`
    ///
    /// An approach can go only while the phase equals its group. Phases 2 and
    /// 3 belong to no group and hold every approach.
    pub fn is_red(&self, direction: Direction, now: Duration) -> SimResult<bool> {
        Ok(self.phase(now) != signal_group(direction)?)
    }
}

/// Fixed right-of-way group of an approach direction
///
/// Intersections are assumed to cross either two diagonals or two axes,
/// never a mix, so each pair of opposite directions shares a group with the
/// matching pair of the other kind:
///
/// | group | diagonal              | axis          |
/// |-------|-----------------------|---------------|
/// | 0     | DownRight, UpLeft     | Right, Left   |
/// | 1     | UpRight, DownLeft     | Up, Down      |
pub fn signal_group(direction: Direction) -> SimResult<u64> {
    match direction {
        Direction::DownRight | Direction::UpLeft | Direction::Right | Direction::Left => Ok(0),
        Direction::UpRight | Direction::DownLeft | Direction::Up | Direction::Down => Ok(1),
        Direction::Intersection | Direction::Empty => Err(SimError::NoSignalGroup(direction)),
    }
}
