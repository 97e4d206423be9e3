//! coilfield: CLI for solving coil fields and managing exported frames

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coilfield::{
    frame_key, solve_scene, Axis, Field, FrameStore, Grid, HeatmapSlice, Playback, Scene, SolverConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "coilfield")]
#[command(about = "Compute Biot-Savart magnetic fields of wire coils and export field frames")]
#[command(version)]
struct Args {
    /// Worker threads for the solver (default: available parallelism)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Log solver and storage detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a scene and print a field summary
    Solve {
        /// Scene description (JSON)
        #[arg(short, long)]
        scene: PathBuf,

        /// Also summarize the middle |B| slice normal to this axis (x, y, z)
        #[arg(long)]
        slice: Option<String>,
    },
    /// Solve a scene and save the result as a frame
    Export {
        #[arg(short, long)]
        scene: PathBuf,

        /// Frame folder
        #[arg(short, long)]
        folder: PathBuf,

        /// Frame sequence number (default: after the last existing frame)
        #[arg(long)]
        index: Option<usize>,
    },
    /// List frames in playback order
    Frames {
        #[arg(short, long)]
        folder: PathBuf,
    },
    /// Load one frame by playback index and print its summary
    Show {
        #[arg(short, long)]
        folder: PathBuf,

        #[arg(long, default_value = "0")]
        index: usize,
    },
}

fn parse_axis(s: &str) -> Result<Axis> {
    match s.to_lowercase().as_str() {
        "x" => Ok(Axis::X),
        "y" => Ok(Axis::Y),
        "z" => Ok(Axis::Z),
        _ => anyhow::bail!("Unknown axis: {}. Use: x, y, or z", s),
    }
}

fn summarize(grid: &Grid, field: &Field) {
    let [i, j, k] = grid.center_index();
    let center = field
        .at(i, j, k)
        .map(|b| (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt())
        .unwrap_or(0.0);
    info!(
        "Field: {:?} samples, |B| center = {:.6e} T, |B| max = {:.6e} T",
        grid.shape(),
        center,
        field.max_magnitude()
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let config = SolverConfig {
        threads: args.threads,
    };

    match args.command {
        Command::Solve { scene, slice } => {
            let scene = Scene::load(&scene).with_context(|| format!("Failed to read scene: {:?}", scene))?;
            let solution = solve_scene(&scene, &config).context("Solve failed")?;
            summarize(&solution.grid, &solution.field);

            if let Some(axis) = slice {
                let axis = parse_axis(&axis)?;
                let magnitude = solution.field.magnitude();
                let heatmap = HeatmapSlice::extract(&solution.grid, &magnitude, axis, None)
                    .context("Grid has no middle slice")?;
                let (lo, hi) = heatmap.value_range();
                info!(
                    "Slice {}[{}]: {}x{} samples, |B| in [{:.6e}, {:.6e}] T",
                    axis, heatmap.index, heatmap.rows, heatmap.cols, lo, hi
                );
            }
        }
        Command::Export { scene, folder, index } => {
            let scene = Scene::load(&scene).with_context(|| format!("Failed to read scene: {:?}", scene))?;
            let store = FrameStore::new(&folder);
            let index = match index {
                Some(index) => index,
                None if folder.exists() => store.next_index()?,
                None => 0,
            };

            let solution = solve_scene(&scene, &config).context("Solve failed")?;
            let path = store
                .save(&frame_key(index), &solution.grid, &solution.field)
                .with_context(|| format!("Failed to save frame {} in {:?}", index, folder))?;
            summarize(&solution.grid, &solution.field);
            info!("Saved frame: {:?}", path);
        }
        Command::Frames { folder } => {
            let playback = Playback::open(&folder).with_context(|| format!("Failed to list {:?}", folder))?;
            for (index, key) in playback.keys().iter().enumerate() {
                println!("{:>4}  {}", index, key);
            }
            info!("{} frame(s) in {:?}", playback.len(), folder);
        }
        Command::Show { folder, index } => {
            let playback = Playback::open(&folder).with_context(|| format!("Failed to list {:?}", folder))?;
            let frame = playback
                .load(index)
                .with_context(|| format!("Failed to load frame #{} from {:?}", index, folder))?;
            info!("Frame #{}: {}", index, playback.key(index).unwrap_or_default());
            summarize(&frame.grid, &frame.field);
        }
    }

    Ok(())
}
