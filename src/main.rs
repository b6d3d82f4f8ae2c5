use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use township_generator::ascii;
use township_generator::config::GenerationConfig;
use township_generator::export;
use township_generator::scheduler::ExpansionScheduler;
use township_generator::{Result, Township};

#[derive(Parser, Debug)]
#[command(name = "township_generator")]
#[command(about = "Generate a river map and grow a city on it")]
struct Args {
    /// Edge length of the square map in tiles
    #[arg(short = 'S', long)]
    size: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of rivers to carve
    #[arg(short, long)]
    rivers: Option<usize>,

    /// Base land value before randomization
    #[arg(long)]
    base_land_value: Option<f32>,

    /// Blocks to grow in one call (the first four are the downtown)
    #[arg(short, long, default_value = "4")]
    blocks: usize,

    /// Additional blocks grown one per scheduler tick after the first call
    #[arg(long, default_value = "0")]
    steps: usize,

    /// Ticks between scheduled expansion units
    #[arg(long, default_value = "0")]
    ticks_between: u32,

    /// JSON config file; command-line values override it
    #[arg(short, long)]
    config: Option<String>,

    /// Print the map as ASCII
    #[arg(long)]
    ascii: bool,

    /// Export a JSON summary to this path
    #[arg(long)]
    export_json: Option<String>,

    /// Export a PNG image to this path
    #[arg(long)]
    export_png: Option<String>,

    /// Pixels per tile in the PNG export
    #[arg(long, default_value = "4")]
    png_scale: u32,

    /// Log filter, e.g. "info" or "township_generator=debug" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(args: &Args) -> Result<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(size) = args.size {
        config.map_size = size;
    }
    if let Some(rivers) = args.rivers {
        config.river_count = rivers;
    }
    if let Some(value) = args.base_land_value {
        config.base_land_value = value;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, size = config.map_size, rivers = config.river_count, "starting");

    let mut township = Township::generate(&config, seed)?;
    let report = township.grow(args.blocks)?;
    info!(
        blocks = report.blocks_added,
        bridges = report.bridges_built,
        exhausted = report.exhausted,
        "initial growth done"
    );

    if args.steps > 0 {
        let mut scheduler = ExpansionScheduler::new(args.ticks_between);
        scheduler.queue(args.steps);
        // Each unit may fail to place; cap total ticks so a boxed-in city ends.
        let max_ticks = (args.steps * 4 + 1) * (args.ticks_between as usize + 1);
        for _ in 0..max_ticks {
            if scheduler.is_idle() {
                break;
            }
            scheduler.tick(&mut township)?;
        }
        info!(pending = scheduler.pending(), "scheduled growth done");
    }

    let city = &township.city;
    info!(
        blocks = city.block_count(),
        band = city.current_expansion_band,
        bridges = city.bridges_built,
        roads = township.map.road_graph.node_count(),
        road_pieces = township.map.road_graph.component_count(),
        "township ready"
    );

    if args.ascii {
        println!("{}", ascii::render(&township.map.grid, Some(city)));
        println!("{}", ascii::legend());
    }
    if let Some(path) = &args.export_json {
        export::export_json(&township.map, Some(city), path)?;
        info!(path = %path, "JSON exported");
    }
    if let Some(path) = &args.export_png {
        export::export_png(&township.map.grid, path, args.png_scale)?;
        info!(path = %path, "PNG exported");
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
