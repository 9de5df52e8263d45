use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use car_sim::render::{draw_frame, AsciiRenderer, ZoomView};
use car_sim::simulation::{
    self, run_threaded, wall_clock, CarId, DrivingRules, Layout, SimWorld, ThreadedConfig, Track,
    TrafficLights, Vector2D, LIGHT_SWITCH_INTERVAL_SECS, RENDER_PERIOD_MS, UPDATE_PERIOD_MS,
};

#[derive(Parser)]
#[command(name = "car_sim")]
#[command(about = "Cars driving on an ASCII tile track")]
struct Cli {
    /// Number of cars to spawn
    #[arg(long, default_value = "8")]
    cars: usize,

    /// Built-in track layout (figure-eight or oval)
    #[arg(long, default_value = "figure-eight")]
    track: Layout,

    /// Load the track from a layout file instead
    #[arg(long)]
    track_file: Option<PathBuf>,

    /// Run every car on its own thread
    #[arg(long)]
    threaded: bool,

    /// Milliseconds between two updates of a car
    #[arg(long, default_value_t = UPDATE_PERIOD_MS)]
    update_ms: u64,

    /// Milliseconds between two rendered frames
    #[arg(long, default_value_t = RENDER_PERIOD_MS)]
    render_ms: u64,

    /// Let blocked cars change lane
    #[arg(long)]
    lane_change: bool,

    /// Steer cars that leave the road back toward the map center
    #[arg(long)]
    recover_off_track: bool,

    /// Seconds between two traffic light phases
    #[arg(long, default_value_t = LIGHT_SWITCH_INTERVAL_SECS)]
    light_interval: u64,

    /// Seed for reproducible spawns
    #[arg(long)]
    seed: Option<u64>,

    /// Stop the single-threaded run after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Stop the threaded run after this many seconds
    #[arg(long)]
    duration: Option<f32>,

    /// Show a zoomed view around this car
    #[arg(long)]
    zoom: Option<usize>,

    /// Do not draw frames, only log
    #[arg(long)]
    no_render: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let track = match &cli.track_file {
        Some(path) => simulation::load_track_file(path)?,
        None => cli.track.build()?,
    };

    let rules = DrivingRules {
        lane_change: cli.lane_change,
        off_track_recovery: cli.recover_off_track,
        ..DrivingRules::default()
    };
    let lights = TrafficLights::new(cli.light_interval);

    let mut world = match cli.seed {
        Some(seed) => SimWorld::new_with_seed(track, rules, lights, seed),
        None => SimWorld::new(track, rules, lights),
    };
    world
        .spawn_cars(cli.cars)
        .context("Track is too small or too crowded for the requested cars")?;

    if cli.threaded {
        run_multi_threaded(&cli, &world)
    } else {
        run_single_threaded(&cli, &mut world)
    }
}

/// Update every car, then draw, once per update period
fn run_single_threaded(cli: &Cli, world: &mut SimWorld) -> Result<()> {
    info!("Running {} cars single-threaded", world.car_count());
    let period = Duration::from_millis(cli.update_ms);

    loop {
        if cli.ticks.is_some_and(|limit| world.ticks >= limit) {
            break;
        }
        let tick_start = std::time::Instant::now();

        world.tick(wall_clock())?;
        if !cli.no_render {
            let renderer = renderer_for(cli, world.rules.collision_radius, focus(cli, world));
            draw_frame(&renderer.render(&world.track, &world.snapshot()));
        }

        if let Some(rest) = period.checked_sub(tick_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!("=== SIMULATION COMPLETE ===");
    info!("Ticks run: {}", world.ticks);
    world.print_summary();
    Ok(())
}

fn run_multi_threaded(cli: &Cli, world: &SimWorld) -> Result<()> {
    let run_for = cli
        .duration
        .map(Duration::try_from_secs_f32)
        .transpose()
        .context("--duration must be a non-negative number of seconds")?;
    let config = ThreadedConfig {
        update_period: Duration::from_millis(cli.update_ms),
        render_period: Duration::from_millis(cli.render_ms),
        run_for,
    };
    info!("Running {} cars on their own threads", world.car_count());

    let radius = world.rules.collision_radius;
    let stats = run_threaded(world, &config, |track: &Track, cars| {
        if cli.no_render {
            return;
        }
        let center = cli
            .zoom
            .and_then(|id| cars.get(id))
            .map(|car| car.position());
        draw_frame(&renderer_for(cli, radius, center).render(track, cars));
    })?;

    info!("=== SIMULATION COMPLETE ===");
    info!("Car updates: {}", stats.car_updates);
    info!("Frames drawn: {}", stats.frames);
    world.print_summary();
    Ok(())
}

/// Position of the car the zoom view follows, if any
fn focus(cli: &Cli, world: &SimWorld) -> Option<Vector2D> {
    cli.zoom
        .and_then(|id| world.car(CarId(id)))
        .map(|car| car.position())
}

fn renderer_for(cli: &Cli, radius: f32, center: Option<Vector2D>) -> AsciiRenderer {
    let zoom = center
        .filter(|_| cli.zoom.is_some())
        .map(|center| ZoomView::around(center, 6.0, 6.0));
    AsciiRenderer::new(radius, zoom)
}
