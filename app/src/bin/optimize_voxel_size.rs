use std::process::ExitCode;

use clap::Parser;

use app::{expand_globs, init_logger, AppError};
use pcd_parser::read_point_cloud;
use pcd_transformer::voxel_size::{optimize_voxel_size, smallest_cloud, VoxelSizeStrategy};

#[derive(Parser, Debug)]
#[command(
    name = "optimize-voxel-size",
    about = "Suggests a voxel size for the smallest of a set of point clouds",
    version = "0.0.1"
)]
struct Cli {
    /// 1: fraction of points kept, 2: multiple of the mean NN distance,
    /// 3: multiple of the mean 8-NN distance
    #[arg(value_name = "STRATEGY")]
    strategy: VoxelSizeStrategy,

    /// Fraction (strategy 1) or multiplier (strategies 2 and 3)
    #[arg(value_name = "K")]
    factor: f64,

    #[arg(required = true, num_args = 1.., value_name = "FILE")]
    inputs: Vec<String>,
}

fn run(args: &Cli) -> Result<f64, AppError> {
    let paths = expand_globs(&args.inputs)?;
    log::info!("strategy: {}, k = {}", args.strategy, args.factor);

    let point_clouds = paths
        .iter()
        .map(|path| read_point_cloud(path))
        .collect::<Result<Vec<_>, _>>()?;
    let Some(smallest) = smallest_cloud(&point_clouds) else {
        return Err(AppError::NoInput(args.inputs.clone()));
    };
    log::info!(
        "smallest cloud: {} ({} points)",
        paths[smallest].display(),
        point_clouds[smallest].len()
    );

    Ok(optimize_voxel_size(
        &point_clouds[smallest],
        args.strategy,
        args.factor,
    )?)
}

fn main() -> ExitCode {
    init_logger();
    let args = Cli::parse();

    match run(&args) {
        Ok(voxel_size) => {
            println!("{:.16}", voxel_size);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
