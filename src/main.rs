use log::{info, warn};
use std::env;
use std::path::Path;
use tilepath::{Cell, Command, CommandLog, ConfigSource, TileResult, World};

/// Simulated frame length
const FRAME_DELTA: f32 = 1.0 / 60.0;

/// Upper bound on frames run after the commands (two minutes of game time)
const MAX_FRAMES: usize = 60 * 120;

fn main() -> TileResult<()> {
    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).map(String::as_str).unwrap_or("config.toml");

    // Read config before the logger so its level can be honoured
    let source = ConfigSource::probe(config_path);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(source.log_level()))
        .init();
    let config = source.resolve(Path::new(config_path));

    let mut world = World::from_config(&config);

    match args.get(2) {
        Some(log_path) => {
            let log = CommandLog::load_from_file(log_path)?;
            log.replay(&mut world)?;
            info!("\n{}", log.summary());
        }
        None => {
            let log = run_demo(&mut world)?;
            log.save_to_file(&config.logging.command_log_path)?;
            info!("Demo commands written to {}", config.logging.command_log_path);
            info!("\n{}", log.summary());
        }
    }

    let frames = world.run_until_idle(FRAME_DELTA, MAX_FRAMES);
    info!("Settled after {} frames", frames);

    for entity in world.movables() {
        info!(
            "entity {} at ({:.2},{:.2}) occupation {:?}",
            entity.id,
            entity.fpos_x,
            entity.fpos_y,
            world.occupation(entity.id)
        );
    }

    let overlaps = world.occupation_overlaps();
    if overlaps.is_empty() {
        info!("No shared cells");
    } else {
        warn!("Shared cells: {:?}", overlaps);
    }

    Ok(())
}

/// Spawn a small squad, select it and send it across the map
fn run_demo(world: &mut World) -> TileResult<CommandLog> {
    let mut log = CommandLog::new();
    for (x, y) in [(10, 10), (11, 10), (10, 11)] {
        log.execute(world, Command::Spawn { x, y })?;
    }
    log.execute(world, Command::Select { ax: 9.0, ay: 9.0, bx: 12.0, by: 12.0 })?;

    let target = Cell::new(30, 20);
    log.execute(world, Command::MoveSelection { x: target.x, y: target.y })?;
    Ok(log)
}
