use std::path::PathBuf;

use clap::Parser;
use fiber_utility::pipeline::{DEFAULT_INPUT, PipelineConfig, no_confirmation, run};
use fiber_utility::processing::neighbor_filter::DISTANCE_THRESHOLD;
use fiber_utility::processing::triangulate::MIN_POINT_NORM;
use log::info;

/// Converts a parallel fiber estimation output file into STL meshes, snapshots
/// and SVG cross-sections, removing fibers that stray from their grid neighbors.
#[derive(Parser, Debug)]
#[command(name = "fiber-utility", version, about)]
struct Cli {
    /// Binary fiber file to read.
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// STL output, defaults to `<input>.stl`.
    mesh_output: Option<PathBuf>,

    /// Snapshot output, defaults to `<input>.pickle`.
    snapshot_output: Option<PathBuf>,

    /// Neighbor distance above which a fiber is removed.
    #[arg(long, default_value_t = DISTANCE_THRESHOLD)]
    distance_threshold: f64,

    /// Points closer than this to the origin are left out of the meshes.
    #[arg(long, default_value_t = MIN_POINT_NORM)]
    min_point_norm: f64,

    /// Stop after the unfiltered outputs.
    #[arg(long)]
    skip_filter: bool,
}

impl From<Cli> for PipelineConfig {
    fn from(cli: Cli) -> Self {
        let defaults = PipelineConfig::new(cli.input);
        PipelineConfig {
            mesh_output: cli.mesh_output.unwrap_or(defaults.mesh_output),
            snapshot_output: cli.snapshot_output.unwrap_or(defaults.snapshot_output),
            distance_threshold: cli.distance_threshold,
            min_point_norm: cli.min_point_norm,
            run_filter: !cli.skip_filter,
            input: defaults.input,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::from(Cli::parse());
    let summary = run(&config, &mut no_confirmation)?;
    info!(
        "done: {} valid, {} invalid, {} artifacts written",
        summary.n_valid,
        summary.n_invalid,
        summary.artifacts.len()
    );
    Ok(())
}
