//! Single-threaded world: spawning, tick order and long runs

use std::collections::HashSet;
use std::time::Duration;

use car_sim::simulation::{
    CarId, CarUpdateResult, DrivingRules, Layout, SimError, SimWorld, Track, TrafficLights,
    Vector2D,
};

fn seeded_world(layout: Layout, rules: DrivingRules, seed: u64) -> SimWorld {
    SimWorld::new_with_seed(layout.build().unwrap(), rules, TrafficLights::default(), seed)
}

/// Light clock that moves to the next phase every 40 ticks
fn light_time(tick: u64) -> Duration {
    Duration::from_secs(((tick / 40) % 4) * 5)
}

#[test]
fn test_spawned_cars_get_their_own_road_tile() {
    let mut world = seeded_world(Layout::FigureEight, DrivingRules::default(), 42);
    let ids = world.spawn_cars(12).unwrap();

    assert_eq!(ids, (0..12).map(CarId).collect::<Vec<_>>());
    assert_eq!(world.car_count(), 12);
    assert_eq!(world.track.registered_count(), 12);

    let mut tiles = HashSet::new();
    for car in world.snapshot() {
        let tile = Track::map_to_tile(car.position());
        assert!(world.track.is_road_at(tile));
        assert!(tiles.insert(tile), "two cars spawned on {}", tile);
    }
}

#[test]
fn test_spawn_parameters_stay_in_bounds() {
    let rules = DrivingRules::default();
    let mut world = seeded_world(Layout::Oval, rules.clone(), 9);
    world.spawn_cars(10).unwrap();

    for car in world.snapshot() {
        assert_eq!(car.speed(), 0.0);
        assert!(car.max_speed() >= rules.max_speed_bounds.min);
        assert!(car.max_speed() <= rules.max_speed_bounds.max);
        assert!(car.acceleration() >= rules.acceleration_bounds.min);
        assert!(car.acceleration() <= rules.acceleration_bounds.max);
    }
}

#[test]
fn test_explicit_spawn_parameters_are_used() {
    let mut world = seeded_world(Layout::Oval, DrivingRules::default(), 5);
    let id = world.spawn_car(Some(0.5), Some(0.2)).unwrap();

    let car = world.car(id).unwrap();
    assert_eq!(car.max_speed(), 0.5);
    assert_eq!(car.acceleration(), 0.2);
}

#[test]
fn test_same_seed_gives_the_same_world() {
    let mut first = seeded_world(Layout::FigureEight, DrivingRules::default(), 1234);
    let mut second = seeded_world(Layout::FigureEight, DrivingRules::default(), 1234);
    first.spawn_cars(6).unwrap();
    second.spawn_cars(6).unwrap();
    assert_eq!(first.snapshot(), second.snapshot());

    for tick in 0..50 {
        first.tick(light_time(tick)).unwrap();
        second.tick(light_time(tick)).unwrap();
    }
    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn test_crowded_track_fails_to_spawn() {
    let mut world = SimWorld::new_with_seed(
        Track::parse("DD").unwrap(),
        DrivingRules::default(),
        TrafficLights::default(),
        3,
    );

    let error = world.spawn_cars(3).unwrap_err();
    assert!(matches!(
        error.root_cause().downcast_ref::<SimError>(),
        Some(SimError::SpawnBudgetExhausted { .. })
    ));
    assert_eq!(world.car_count(), 2);
}

#[test]
fn test_tick_updates_cars_in_id_order() {
    let mut world = SimWorld::new(
        Track::parse(&"D".repeat(20)).unwrap(),
        DrivingRules::default(),
        TrafficLights::default(),
    );
    let leader = world.add_car_at(Vector2D::new(3.5, 0.5), 1.0, 1.0);
    let follower = world.add_car_at(Vector2D::new(2.5, 0.5), 1.0, 1.0);

    // The follower already sees the leader a tile further
    let results = world.tick(Duration::ZERO).unwrap();
    assert_eq!(
        results,
        vec![
            (leader, CarUpdateResult::Cruising),
            (follower, CarUpdateResult::Cruising)
        ]
    );
    assert_eq!(world.ticks, 1);
    assert_eq!(world.car(follower).unwrap().position(), Vector2D::new(3.5, 0.5));
}

#[test]
fn test_unknown_car_is_none() {
    let world = seeded_world(Layout::Oval, DrivingRules::default(), 1);
    assert!(world.car(CarId(3)).is_none());
}

fn assert_long_run_is_safe(layout: Layout, rules: DrivingRules, cars: usize, seed: u64) {
    let min_gap = rules.collision_radius * 2.0;
    let mut world = seeded_world(layout, rules, seed);
    world.spawn_cars(cars).unwrap();
    let initial = world.snapshot();

    for tick in 0..200 {
        world
            .tick(light_time(tick))
            .unwrap_or_else(|err| panic!("{} seed {} tick {}: {:#}", layout, seed, tick, err));

        let snapshot = world.snapshot();
        for (car, start) in snapshot.iter().zip(&initial) {
            assert!(car.speed() >= 0.0);
            assert!(car.speed() <= car.max_speed() + 1e-6);
            assert_eq!(car.max_speed(), start.max_speed());
            assert_eq!(car.acceleration(), start.acceleration());
        }
        for (index, car) in snapshot.iter().enumerate() {
            for other in &snapshot[index + 1..] {
                let gap = car.position().distance(&other.position());
                assert!(
                    gap >= min_gap,
                    "{} seed {} tick {}: cars {} and {} are {} apart",
                    layout,
                    seed,
                    tick,
                    car.id(),
                    other.id(),
                    gap
                );
            }
        }
    }
}

#[test]
fn test_figure_eight_runs_without_collisions() {
    for seed in 1..=5 {
        assert_long_run_is_safe(Layout::FigureEight, DrivingRules::default(), 8, seed);
    }
}

#[test]
fn test_oval_runs_without_collisions() {
    for seed in 1..=5 {
        assert_long_run_is_safe(Layout::Oval, DrivingRules::default(), 6, seed);
    }
}

#[test]
fn test_lane_changes_keep_cars_apart() {
    let rules = DrivingRules {
        lane_change: true,
        ..DrivingRules::default()
    };
    for seed in 1..=3 {
        assert_long_run_is_safe(Layout::FigureEight, rules.clone(), 8, seed);
        assert_long_run_is_safe(Layout::Oval, rules.clone(), 6, seed);
    }
}
