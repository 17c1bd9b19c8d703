use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use city_generator::config::CityConfig;
use city_generator::export::{export_city_plan, export_input_maps};
use city_generator::generate_city;
use city_generator::terrain::{NoiseSampler, RasterSampler, SampleConvention, DEFAULT_RASTER_SIDE};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Convention {
    /// Sampler reads (u, v) in [0, 1]
    Unit,
    /// Sampler reads (u, v) in [-1, 1]
    Signed,
}

impl From<Convention> for SampleConvention {
    fn from(convention: Convention) -> Self {
        match convention {
            Convention::Unit => SampleConvention::UnitSquare,
            Convention::Signed => SampleConvention::SignedUnitSquare,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "city_generator")]
#[command(about = "Generate a procedural city over noise terrain")]
struct Args {
    /// Random seed for roads and buildings (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file overriding the default generation parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the terrain noise (defaults to the city seed)
    #[arg(long)]
    terrain_seed: Option<u64>,

    /// Coordinate square the terrain sampler reads
    #[arg(long, value_enum, default_value = "unit")]
    convention: Convention,

    /// Export a top-down plan of the city to PNG
    #[arg(long)]
    export_plan: Option<PathBuf>,

    /// Export the terrain inputs (height and population) to PNG
    #[arg(long)]
    export_inputs: Option<PathBuf>,

    /// Side length in pixels of exported images
    #[arg(long, default_value = "512")]
    plan_size: u32,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CityConfig::load(path)?,
        None => CityConfig::default(),
    };

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let terrain_seed = args.terrain_seed.unwrap_or(seed);
    println!("Using seed: {}", seed);
    if terrain_seed != seed {
        println!("Using terrain seed: {}", terrain_seed);
    }

    println!("Baking terrain ({0}x{0})...", DEFAULT_RASTER_SIDE);
    let noise = NoiseSampler::new(terrain_seed, args.convention.into());
    let terrain = RasterSampler::bake(&noise, DEFAULT_RASTER_SIDE);

    println!("Generating city...");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let scene = generate_city(&terrain, &config, &mut rng);

    let stats = &scene.roads.stats;
    println!("Roads:");
    if stats.used_fallback_seed {
        println!("  No land seed found, grew from the origin");
    } else {
        println!("  Seeds: {}", stats.seeds);
    }
    println!("  Highways: {} ({:.1} units)", scene.roads.len(), scene.roads.total_length());
    println!("  Extensions: {}, joins: {}", stats.extensions, stats.joins);
    println!(
        "  Pruned: {} in water, {} out of bounds, {} left queued",
        stats.pruned_water, stats.pruned_bounds, stats.abandoned
    );
    println!("Buildings: {} of {} attempts", scene.buildings.len(), config.building_attempts);
    println!(
        "Land coverage: {:.1}%",
        scene.grid.land_fraction(config.water_threshold) * 100.0
    );
    println!(
        "Instances: {} roads, {} buildings, {} grid cells",
        scene.road_instances.len(),
        scene.building_instances.len(),
        scene.grid_instances.len()
    );

    if let Some(path) = &args.export_inputs {
        println!("Exporting terrain inputs to {}...", path.display());
        export_input_maps(&terrain, &config, args.plan_size, path)?;
    }

    if let Some(path) = &args.export_plan {
        println!("Exporting city plan to {}...", path.display());
        export_city_plan(&scene, &config, args.plan_size, path)?;
    }

    println!("Done!");
    Ok(())
}
