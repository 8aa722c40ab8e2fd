use std::{path::PathBuf, process::ExitCode};

use clap::Parser;

use app::{init_logger, AppError};
use pcd_exporter::write_point_cloud;
use pcd_parser::read_point_cloud;
use pcd_transformer::{
    builder::NormalEstimationTransformBuilder,
    runner::{PointCloudTransformer, Transformer as _},
};

#[derive(Parser, Debug)]
#[command(
    name = "create-normals",
    about = "Estimates unit normals oriented toward +z and writes the cloud back out",
    version = "0.0.1"
)]
struct Cli {
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file; format taken from the extension (ply, xyz, xyzn, xyzrgb, csv)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

fn run(args: &Cli) -> Result<(), AppError> {
    let point_cloud = read_point_cloud(&args.input)?;
    log::info!(
        "read {} points from {}",
        point_cloud.len(),
        args.input.display()
    );

    let start = std::time::Instant::now();
    let transformer = PointCloudTransformer::from_builder(&NormalEstimationTransformBuilder)?;
    let point_cloud = transformer.execute(point_cloud)?;
    log::info!("estimated normals in {:?}", start.elapsed());

    write_point_cloud(&args.output, &point_cloud)?;
    Ok(())
}

fn main() -> ExitCode {
    init_logger();
    let args = Cli::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
