use std::path::PathBuf;

use anyhow::{Context, Result};
use cgmath::{Point3, Vector3};
use log::{error, info};
use structopt::StructOpt;

use voxsim::files::FileContext;
use voxsim::headless;
use voxsim::metrics_report::MetricsReport;
use voxsim_voxels::{
    block::{face_layers, texture_index_map},
    Block, VoxelWorld,
};
use voxsim_world::{physics::AGENT_SIZE, worldgen, GenerateWorldConfig};

#[derive(Debug, StructOpt)]
struct Opts {
    /// Directory holding saves and settings. Defaults to a directory in the user's documents.
    #[structopt(short, long)]
    data_root: Option<PathBuf>,
    #[structopt(subcommand)]
    action: Action,
}

#[derive(Debug, StructOpt)]
enum Action {
    /// Generates a new world and saves it.
    Generate {
        #[structopt(flatten)]
        options: GenerateOpts,
    },
    /// Loads a world and runs the simulation on it without rendering.
    Simulate {
        #[structopt(flatten)]
        options: SimulateOpts,
    },
    /// Prints statistics about a saved world.
    Info {
        #[structopt(short, long)]
        save_name: String,
    },
    /// Lists every block.
    Blocks,
}

#[derive(Debug, StructOpt)]
struct GenerateOpts {
    #[structopt(short, long)]
    save_name: String,
    /// YAML file with a world generation config.
    #[structopt(short, long)]
    config: Option<PathBuf>,
    /// Overrides the seed from the config.
    #[structopt(long)]
    seed: Option<u64>,
}

#[derive(Debug, StructOpt)]
struct SimulateOpts {
    #[structopt(short, long)]
    save_name: String,
    /// Overrides the tick count from the settings file.
    #[structopt(short, long)]
    ticks: Option<u64>,
    /// Writes the world back to the save after the run.
    #[structopt(long)]
    write_back: bool,
}

fn run(opt: Opts) -> Result<()> {
    if let Action::Blocks = opt.action {
        run_blocks();
        return Ok(());
    }

    let ctx = FileContext::load(opt.data_root.clone())?;
    ctx.ensure_directories()?;
    let mut report = MetricsReport::install()?;

    match &opt.action {
        Action::Generate { options } => run_generate(&ctx, options, &mut report),
        Action::Simulate { options } => run_simulate(&ctx, options, &mut report),
        Action::Info { save_name } => run_info(&ctx, save_name),
        Action::Blocks => Ok(()),
    }
}

/// Places the agent on the surface in the middle of the world.
fn spawn_point(world: &VoxelWorld) -> Point3<f32> {
    let size = world.size();
    let (x, z) = (size.x / 2, size.z / 2);
    let y = match world.first_non_air(x, z) {
        Some(ground) => ground as f32 - AGENT_SIZE.y,
        None => 0.0,
    };
    Point3::new(x as f32 + 0.2, y, z as f32 + 0.2)
}

fn run_generate(
    ctx: &FileContext,
    options: &GenerateOpts,
    report: &mut MetricsReport,
) -> Result<()> {
    let mut config: GenerateWorldConfig = match &options.config {
        Some(path) => {
            let config_file = std::fs::File::open(path)
                .with_context(|| format!("Opening world config {}", path.to_string_lossy()))?;
            serde_yaml::from_reader(config_file).context("Parsing world config")?
        }
        None => GenerateWorldConfig::default(),
    };
    if let Some(seed) = options.seed {
        config.seed = seed;
    }

    let world = worldgen::generate_world(&config)?;
    info!("Generated world: {:?}", world.debug_summary());
    info!("Generation metrics:\n{}", report.drain());

    info!("Saving");
    ctx.save_world(options.save_name.as_str(), &world, spawn_point(&world))?;

    Ok(())
}

fn run_simulate(
    ctx: &FileContext,
    options: &SimulateOpts,
    report: &mut MetricsReport,
) -> Result<()> {
    let mut settings = ctx.load_settings()?;
    if let Some(ticks) = options.ticks {
        settings.simulate.ticks = ticks;
    }

    let saved = ctx.load_world(options.save_name.as_str())?;
    info!("Loaded world: {:?}", saved.world.debug_summary());

    let outcome = headless::run_simulation(saved, &settings)?;
    info!("Finished: {:?}", outcome.summary);
    info!("Chunk rebuilds: {:?}", outcome.stats);
    info!("Final metrics:\n{}", report.drain());

    if options.write_back {
        info!("Saving");
        ctx.save_world(
            options.save_name.as_str(),
            &outcome.saved.world,
            outcome.saved.player_position,
        )?;
    }

    Ok(())
}

fn run_info(ctx: &FileContext, save_name: &str) -> Result<()> {
    let saved = ctx.load_world(save_name)?;
    let summary = saved.world.debug_summary();

    println!("{}", serde_yaml::to_string(&summary)?);
    println!("player_position: {:?}", saved.player_position);
    for (block, count) in saved.world.block_counts() {
        println!("{:>24} {:>10}", block.name(), count);
    }

    let size: Vector3<i64> = saved.world.size();
    let lit_columns = saved
        .world
        .iter_columns()
        .filter(|&(x, z)| saved.world.skylight(Point3::new(x, size.y - 1, z)) > 0)
        .count();
    println!("columns lit to the floor: {}", lit_columns);

    Ok(())
}

fn run_blocks() {
    let index_map = texture_index_map();
    info!("{} distinct textures", index_map.len());

    for &block in Block::ALL.iter().filter(|&&block| block != Block::Null) {
        let flags = block.info().flags;
        let mut kinds = Vec::new();
        if flags.slab {
            kinds.push("slab");
        }
        if flags.cross {
            kinds.push("cross");
        }
        if flags.crop {
            kinds.push("crop");
        }
        if flags.fire {
            kinds.push("fire");
        }

        let layers = match face_layers(block, &index_map) {
            Some(faces) => format!("{}/{}/{}", faces.top, faces.front, faces.bottom),
            None => "-".to_string(),
        };

        println!(
            "{:>3} {:<24} {:<24} {:<12} {}",
            block.to_u8(),
            block.name(),
            block.display_name(),
            layers,
            kinds.join(",")
        );
    }
}

fn main() {
    env_logger::init();

    match run(Opts::from_args()) {
        Ok(()) => (),
        Err(end_error) => {
            for error in end_error.chain() {
                error!("{}", error);
                error!("========");
            }
        }
    }
}
