use std::{path::PathBuf, process::ExitCode};

use clap::Parser;

use app::{extract_features, init_logger, init_thread_pool, ExtractOptions};
use pcd_exporter::OutputMode;
use pcd_metrics::{MetricSelection, MetricsConfig, NeighborhoodSizes};

#[derive(Parser, Debug)]
#[command(
    name = "bitdance",
    about = "Extracts local-neighborhood color and geometry distortion histograms from a point cloud",
    version = "0.0.1"
)]
struct Cli {
    /// Input point cloud (ply, xyz, xyzn, xyzrgb, csv, txt, las, laz)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Comma-separated neighborhood sizes, at most 16, e.g. "4,8,12"
    #[arg(short, long, value_name = "SIZES")]
    neighborhoods: NeighborhoodSizes,

    /// Five comma-separated 0/1 flags enabling the metrics in catalog order
    #[arg(short, long, value_name = "FLAGS")]
    metrics: Option<MetricSelection>,

    /// Voxel size for downsampling before the metric pass
    #[arg(short, long, value_name = "SIZE")]
    voxel_size: Option<f64>,

    /// Divide colors by 255 after reading
    #[arg(short = 'y', long)]
    divide_color_by_255: bool,

    /// Write one file per metric and neighborhood size
    #[arg(short, long)]
    split: bool,

    /// Output CSV file, or the base name of the split files
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Worker threads (defaults to all logical CPUs)
    #[arg(short, long)]
    threads: Option<usize>,
}

fn main() -> ExitCode {
    init_logger();

    let args = Cli::parse();
    let metrics = args.metrics.unwrap_or_default();

    log::info!("input file: {}", args.input.display());
    log::info!(
        "neighborhood sizes: {:?} (max {})",
        args.neighborhoods.sizes(),
        args.neighborhoods.max()
    );
    for metric in metrics.enabled() {
        log::info!("enabled: {}", metric);
    }
    if let Some(voxel_size) = args.voxel_size {
        log::info!("voxel size: {}", voxel_size);
    }

    let threads = match init_thread_pool(args.threads) {
        Ok(threads) => threads,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("worker threads: {}", threads);

    let options = ExtractOptions {
        input: args.input,
        config: MetricsConfig::new(args.neighborhoods, metrics),
        voxel_size: args.voxel_size,
        divide_color_by_255: args.divide_color_by_255,
        output: args.output,
        mode: if args.split {
            OutputMode::Split
        } else {
            OutputMode::Combined
        },
    };

    let start = std::time::Instant::now();
    match extract_features(&options) {
        Ok(vectors) => {
            log::info!("{} feature vectors in {:?}", vectors.len(), start.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
