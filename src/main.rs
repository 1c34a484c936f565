use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use skyrail::config::WorldConfig;
use skyrail::export;
use skyrail::rail::kit::{AlternatingRailKit, RailKit, SectionCandidate};
use skyrail::rail::path::path_length;
use skyrail::world::{SpawnOutcome, TrackKit, World};

#[derive(Parser, Debug)]
#[command(name = "skyrail")]
#[command(about = "Spawn floating islands, connect them by rail and run a train around the network")]
struct Args {
    /// Number of islands to spawn
    #[arg(short = 'n', long, default_value = "5")]
    islands: usize,

    /// Random seed (uses the config seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON world config; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base island grid resolution
    #[arg(long)]
    resolution: Option<u32>,

    /// Name prefix for spawned islands
    #[arg(long, default_value = "FloatingIsland")]
    prefix: String,

    /// Rail kit: "capped", "alternating" or "none"
    #[arg(long, default_value = "capped")]
    kit: String,

    /// Measured sections for the alternating kit as "sleepers:length" pairs
    #[arg(long, default_value = "4:4.2,3:3.1")]
    sections: String,

    /// Seconds of train simulation
    #[arg(long, default_value = "30.0")]
    simulate: f32,

    /// Simulation time step in seconds
    #[arg(long, default_value = "0.1")]
    dt: f32,

    /// Train speed override
    #[arg(long)]
    speed: Option<f32>,

    /// Export world summary JSON
    #[arg(long)]
    export_summary: Option<PathBuf>,

    /// Export a top-down world map PNG
    #[arg(long)]
    export_map: Option<PathBuf>,

    /// Size of the exported world map in pixels
    #[arg(long, default_value = "768")]
    map_size: u32,
}

fn parse_sections(raw: &str) -> Result<Vec<SectionCandidate>, String> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let (sleepers, length) = part
                .split_once(':')
                .ok_or_else(|| format!("section '{}' is not sleepers:length", part.trim()))?;
            let sleeper_count = sleepers
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("bad sleeper count in '{}': {}", part.trim(), e))?;
            let length = length
                .trim()
                .parse::<f32>()
                .map_err(|e| format!("bad length in '{}': {}", part.trim(), e))?;
            Ok(SectionCandidate { sleeper_count, length })
        })
        .collect()
}

fn parse_kit(name: &str, sections: &str) -> Result<Option<TrackKit>, String> {
    match name {
        "capped" => Ok(Some(TrackKit::Capped(RailKit::default()))),
        "alternating" => {
            let candidates = parse_sections(sections)?;
            let kit = AlternatingRailKit::from_candidates(&candidates)
                .ok_or_else(|| format!("alternating kit needs at least two sections, got {}", candidates.len()))?;
            Ok(Some(TrackKit::Alternating(kit)))
        }
        "none" => Ok(None),
        other => Err(format!("unknown rail kit '{}'", other)),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WorldConfig::from_path(path)?,
        None => WorldConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(resolution) = args.resolution {
        config.base_resolution = resolution;
    }
    if let Some(speed) = args.speed {
        config.train.speed = speed;
    }
    config.validate()?;
    let kit = parse_kit(&args.kit, &args.sections)?;

    println!("Building world with seed: {}", config.seed);
    println!("World radius: {:.0}, base resolution: {}", config.world_radius, config.base_resolution);

    let mut world = World::new(config);
    world.set_rail_kit(kit);

    println!("Spawning {} islands...", args.islands);
    for _ in 0..args.islands {
        match world.spawn_random_island(&args.prefix) {
            SpawnOutcome::Spawned(report) => println!(
                "  {} at ({:.1}, {:.1}, {:.1}) r={:.1} n={} tris={}",
                report.name,
                report.position.x,
                report.position.y,
                report.position.z,
                report.radius,
                report.resolution,
                report.triangle_count
            ),
            SpawnOutcome::NoSpace => {
                println!("  No space left for another island, stopping");
                break;
            }
        }
    }

    println!(
        "Islands: {}, edges: {}, rail pieces: {}, path segments: {} ({:.1} units)",
        world.island_count(),
        world.edge_count(),
        world.rail_piece_count(),
        world.path_segment_count(),
        path_length(world.path())
    );

    if args.simulate > 0.0 && args.dt > 0.0 {
        println!("Simulating train for {:.1}s...", args.simulate);
        let steps = (args.simulate / args.dt).ceil() as usize;
        for _ in 0..steps {
            world.tick(args.dt);
        }
        let state = world.train_state();
        println!(
            "Train at ({:.1}, {:.1}, {:.1}), heading {:.1}°, pitch {:.1}°, travelled {:.1}, loops {}",
            state.position.x,
            state.position.y,
            state.position.z,
            state.heading.to_degrees(),
            state.pitch.to_degrees(),
            state.travelled,
            state.loop_count
        );
    }

    if let Some(path) = &args.export_summary {
        export::export_world_summary_json(&world.summary(), path)?;
        println!("Summary written to {}", path.display());
    }
    if let Some(path) = &args.export_map {
        export::export_world_map_png(&world, args.map_size, path)?;
        println!("World map written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sections_build_alternating_kit() {
        let kit = parse_kit("alternating", "4:4.2,3:3.1").unwrap();
        assert_eq!(kit, Some(TrackKit::Alternating(AlternatingRailKit::new(4.2, 3.1))));
    }

    #[test]
    fn test_sections_pick_long_and_short() {
        let Some(TrackKit::Alternating(kit)) = parse_kit("alternating", "2:1.5, 3:3.0 ,5:6.5").unwrap() else {
            panic!("expected an alternating kit");
        };
        assert_eq!(kit.long_length, 6.5);
        assert_eq!(kit.short_length, 3.0);
    }

    #[test]
    fn test_bad_sections_are_rejected() {
        assert!(parse_kit("alternating", "4:4.2").is_err());
        assert!(parse_kit("alternating", "4-4.2,3:3.1").is_err());
        assert!(parse_kit("alternating", "four:4.2,3:3.1").is_err());
        assert!(parse_kit("capped", "").unwrap().is_some());
        assert!(parse_kit("none", "").unwrap().is_none());
        assert!(parse_kit("monorail", "").is_err());
    }
}
