//! Roadgrid Demo
//!
//! Drives a block of city streets full of cars for a number of ticks and
//! reports membership changes, deaths, and visibility between cars.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use roadgrid::{
    game::events::SpatialEventData,
    CollisionCategory, GridConfig, SpatialGrid, Sprite, Vec2, World, WorldConfig, VERSION,
};

/// City block pitch in cells: buildings fill the last `BUILDING` cells of each block.
const BLOCK: u32 = 8;
const BUILDING: u32 = 3;

#[derive(Parser)]
#[command(name = "roadgrid", about = "Spatial grid demo simulation")]
struct Cli {
    /// JSON world config (defaults: 128x128 cells of 60 units, 60 Hz)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value = "600")]
    ticks: u32,

    /// Number of cars to spawn
    #[arg(long, default_value = "64")]
    cars: u32,

    /// Seed for car placement and headings
    #[arg(short, long, default_value = "12345")]
    seed: u64,

    /// Print every event as JSON
    #[arg(long)]
    events: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => WorldConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => WorldConfig::default(),
    };

    info!("Roadgrid v{}", VERSION);
    info!(
        "Grid: {}x{} cells of {} units, {} Hz",
        config.grid.width, config.grid.height, config.grid.cell_size, config.tick_rate
    );

    let grid = city_grid(&config.grid)?;
    let mut world = World::new(grid);
    spawn_cars(&mut world, cli.cars, cli.seed);
    info!("Spawned {} cars", world.alive_count());

    run(&mut world, &config, &cli)
}

/// Streets between square buildings.
fn city_grid(config: &GridConfig) -> anyhow::Result<SpatialGrid> {
    let mask: Vec<bool> = (0..config.height)
        .flat_map(|row| (0..config.width).map(move |col| (col, row)))
        .map(|(col, row)| col % BLOCK >= BLOCK - BUILDING && row % BLOCK >= BLOCK - BUILDING)
        .collect();
    Ok(SpatialGrid::with_collision_mask(config, &mask)?)
}

fn spawn_cars(world: &mut World, count: u32, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let size = world.grid().cell_size();
    let span = world.grid().width().min(world.grid().height());
    let streets = (span / BLOCK).max(1);

    for i in 0..count {
        // Alternate between vertical and horizontal streets
        let lane = rng.gen_range(0..streets) as f32;
        let along = rng.gen_range(0..span) as f32;
        let speed: f32 = rng.gen_range(60.0..300.0);
        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };

        let street = lane * BLOCK as f32 * size + size * 0.5;
        let offset = along * size + size * 0.5;
        let (position, velocity, heading) = if i % 2 == 0 {
            (Vec2::new(street, offset), Vec2::new(0.0, sign * speed), if sign > 0.0 { 180.0 } else { 0.0 })
        } else {
            (Vec2::new(offset, street), Vec2::new(sign * speed, 0.0), if sign > 0.0 { 90.0 } else { 270.0 })
        };

        let car = Sprite::new("car1", position)
            .with_collision(
                CollisionCategory::VEHICLE,
                CollisionCategory::VEHICLE | CollisionCategory::PEDESTRIAN,
            )
            .with_rotation(heading)
            .with_velocity(velocity);
        world.spawn(car);
    }
}

fn run(world: &mut World, config: &WorldConfig, cli: &Cli) -> anyhow::Result<()> {
    let delta = config.tick_delta();
    let mut moves = 0usize;
    let mut deaths = 0usize;
    let mut last_report_tick = 0;

    info!("Running {} ticks...", cli.ticks);

    for _ in 0..cli.ticks {
        let events = world.run(delta);
        for event in &events {
            match &event.data {
                SpatialEventData::NodeChanged { .. } => moves += 1,
                SpatialEventData::Died { position, .. } => {
                    deaths += 1;
                    info!("Car {} drove off the map at {}", event.entity, position);
                }
                _ => {}
            }
            if cli.events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
        world.reap();

        // Report every 5 seconds
        let t = world.tick();
        if t - last_report_tick >= config.tick_rate * 5 {
            report(world);
            last_report_tick = t;
        }
    }

    info!("=== Results ===");
    info!("Cell changes: {}", moves);
    info!("Deaths: {}", deaths);
    report(world);
    Ok(())
}

/// Log visibility and crowding among the surviving cars.
fn report(world: &World) {
    let ids: Vec<_> = world.sprites().filter(|s| s.is_alive()).map(|s| s.id).collect();

    let mut visible_pairs = 0usize;
    let mut total_pairs = 0usize;
    let mut crowded = 0usize;
    for (i, &a) in ids.iter().enumerate() {
        if !world.is_clear(a, None).unwrap_or(true) {
            crowded += 1;
        }
        for &b in &ids[i + 1..] {
            total_pairs += 1;
            if world.can_see(a, b).unwrap_or(false) {
                visible_pairs += 1;
            }
        }
    }

    info!(
        "Tick {}: {} alive, {} crowded, {}/{} pairs in line of sight, {} registrations",
        world.tick(),
        ids.len(),
        crowded,
        visible_pairs,
        total_pairs,
        world.grid().occupant_total()
    );
}
