//! Traffic light timing and right-of-way groups

use std::time::Duration;

use car_sim::simulation::{signal_group, Direction, SimError, TrafficLights, LIGHT_PHASE_COUNT};

fn at(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

#[test]
fn test_phase_follows_the_clock() {
    let lights = TrafficLights::default();

    assert_eq!(lights.phase(at(0)), 0);
    assert_eq!(lights.phase(at(4)), 0);
    assert_eq!(lights.phase(at(5)), 1);
    assert_eq!(lights.phase(at(10)), 2);
    assert_eq!(lights.phase(at(19)), 3);
    assert_eq!(lights.phase(at(20)), 0);
}

#[test]
fn test_phase_restarts_every_minute() {
    let lights = TrafficLights::new(7);

    // 56 seconds into the minute is phase 8 % 4, the next minute starts over
    assert_eq!(lights.phase(at(56)), 0);
    assert_eq!(lights.phase(at(59)), 0);
    assert_eq!(lights.phase(at(60)), 0);
    assert_eq!(lights.phase(at(67)), 1);
}

#[test]
fn test_cycle_covers_every_phase() {
    let lights = TrafficLights::default();
    assert_eq!(lights.cycle(), at(5 * LIGHT_PHASE_COUNT));

    for secs in 0..20 {
        assert_eq!(lights.phase(at(secs)), lights.phase(at(secs) + lights.cycle()));
    }
}

#[test]
fn test_light_state_only_depends_on_time() {
    let lights = TrafficLights::default();
    let now = Duration::from_millis(1_700_000_012_345);

    let first = lights.is_red(Direction::Right, now).unwrap();
    for _ in 0..10 {
        assert_eq!(lights.is_red(Direction::Right, now).unwrap(), first);
    }
}

#[test]
fn test_signal_groups() {
    for direction in [
        Direction::DownRight,
        Direction::UpLeft,
        Direction::Right,
        Direction::Left,
    ] {
        assert_eq!(signal_group(direction).unwrap(), 0, "{:?}", direction);
    }
    for direction in [
        Direction::UpRight,
        Direction::DownLeft,
        Direction::Up,
        Direction::Down,
    ] {
        assert_eq!(signal_group(direction).unwrap(), 1, "{:?}", direction);
    }
}

#[test]
fn test_crossing_approaches_are_never_green_together() {
    let lights = TrafficLights::default();

    for secs in 0..60 {
        let diagonal_a = lights.is_red(Direction::DownRight, at(secs)).unwrap();
        let diagonal_b = lights.is_red(Direction::DownLeft, at(secs)).unwrap();
        assert!(diagonal_a || diagonal_b, "both diagonals green at {}s", secs);

        let axis_a = lights.is_red(Direction::Right, at(secs)).unwrap();
        let axis_b = lights.is_red(Direction::Down, at(secs)).unwrap();
        assert!(axis_a || axis_b, "both axes green at {}s", secs);
    }
}

#[test]
fn test_last_two_phases_hold_everyone() {
    let lights = TrafficLights::default();

    for secs in [10, 14, 15, 19] {
        for direction in Direction::COMPASS {
            assert!(lights.is_red(direction, at(secs)).unwrap());
        }
    }
}

#[test]
fn test_opposite_directions_share_the_light() {
    let lights = TrafficLights::default();

    assert!(!lights.is_red(Direction::Right, at(0)).unwrap());
    assert!(!lights.is_red(Direction::Left, at(0)).unwrap());
    assert!(lights.is_red(Direction::Up, at(0)).unwrap());

    assert!(!lights.is_red(Direction::Up, at(5)).unwrap());
    assert!(!lights.is_red(Direction::Down, at(5)).unwrap());
    assert!(lights.is_red(Direction::Right, at(5)).unwrap());
}

#[test]
fn test_non_directions_have_no_group() {
    let lights = TrafficLights::default();

    assert_eq!(
        signal_group(Direction::Intersection).unwrap_err(),
        SimError::NoSignalGroup(Direction::Intersection)
    );
    assert_eq!(
        lights.is_red(Direction::Empty, at(0)).unwrap_err(),
        SimError::NoSignalGroup(Direction::Empty)
    );
}

#[test]
fn test_zero_interval_is_raised_to_one_second() {
    let lights = TrafficLights::new(0);
    assert_eq!(lights.switch_interval_secs(), 1);
    assert_eq!(lights.phase(at(3)), 3);
}
