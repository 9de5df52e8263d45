//! Car threads running alongside the render loop

use std::time::Duration;

use car_sim::simulation::{
    run_threaded, DrivingRules, Layout, SimWorld, ThreadedConfig, Track, TrafficLights, Vector2D,
};

fn fast_config(run_for: Duration) -> ThreadedConfig {
    ThreadedConfig {
        update_period: Duration::from_millis(10),
        render_period: Duration::from_millis(20),
        run_for: Some(run_for),
    }
}

#[test]
fn test_threaded_run_moves_every_car() {
    let mut world = SimWorld::new_with_seed(
        Layout::Oval.build().unwrap(),
        DrivingRules::default(),
        TrafficLights::default(),
        17,
    );
    world.spawn_cars(6).unwrap();
    let before = world.snapshot();

    let mut frame_sizes = Vec::new();
    let stats = run_threaded(&world, &fast_config(Duration::from_millis(300)), |_, cars| {
        frame_sizes.push(cars.len());
    })
    .unwrap();

    assert!(stats.car_updates > 0);
    assert!(stats.frames > 0);
    assert_eq!(stats.frames as usize, frame_sizes.len());
    assert!(frame_sizes.iter().all(|&size| size == 6));

    let after = world.snapshot();
    for (car, start) in after.iter().zip(&before) {
        assert_eq!(car.id(), start.id());
        assert!(car.speed() >= 0.0 && car.speed() <= car.max_speed() + 1e-6);
        assert_eq!(car.max_speed(), start.max_speed());
    }
    assert!(after.iter().zip(&before).any(|(car, start)| car.position() != start.position()));
}

#[test]
fn test_failing_car_stops_the_run() {
    let mut world = SimWorld::new(
        Track::parse("DDDDDA").unwrap(),
        DrivingRules::default(),
        TrafficLights::default(),
    );
    world.add_car_at(Vector2D::new(4.5, 0.5), 1.0, 1.0);

    let error = run_threaded(&world, &fast_config(Duration::from_secs(5)), |_, _| {}).unwrap_err();
    assert!(format!("{:#}", error).contains("failed to update"));
}

#[test]
fn test_empty_world_renders_until_time_is_up() {
    let world = SimWorld::new(
        Layout::Oval.build().unwrap(),
        DrivingRules::default(),
        TrafficLights::default(),
    );

    let stats = run_threaded(&world, &fast_config(Duration::from_millis(100)), |_, cars| {
        assert!(cars.is_empty());
    })
    .unwrap();
    assert_eq!(stats.car_updates, 0);
    assert!(stats.frames > 0);
}
