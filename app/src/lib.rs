//! Shared plumbing for the command-line tools: logging, input expansion, the
//! worker pool and the extraction pipeline behind `bitdance`.

use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use chrono::Local;
use env_logger::Builder;
use glob::glob;
use log::LevelFilter;
use thiserror::Error;

use pcd_core::pointcloud::index::KdTreeIndex;
use pcd_exporter::{ExportError, OutputMode, ResultWriter};
use pcd_metrics::{FeatureVector, MetricEngine, MetricError, MetricsConfig};
use pcd_parser::{read_point_cloud, ParseError};
use pcd_transformer::{
    builder::PreprocessTransformBuilder,
    runner::{PointCloudTransformer, Transformer as _},
    TransformError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Metric(#[from] MetricError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("invalid glob pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("no input files matched {0:?}")]
    NoInput(Vec<String>),
    #[error("failed to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();
}

/// Sizes the global rayon pool; `None` uses every logical CPU.
pub fn init_thread_pool(threads: Option<usize>) -> Result<usize, AppError> {
    let threads = threads.unwrap_or_else(num_cpus::get).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;
    Ok(threads)
}

pub fn expand_globs(input_patterns: &[String]) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for pattern in input_patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let entries = glob(pattern).map_err(|source| AppError::Glob {
                pattern: pattern.clone(),
                source,
            })?;
            for entry in entries {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => log::warn!("skipping unreadable glob match: {}", e),
                }
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    if paths.is_empty() {
        return Err(AppError::NoInput(input_patterns.to_vec()));
    }
    Ok(paths)
}

/// Inputs in the `.xyzrgb` format carry colors on the 0..255 scale.
pub fn needs_color_rescale(input: &Path, requested: bool) -> bool {
    requested || input.to_string_lossy().contains(".xyzrgb")
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub input: PathBuf,
    pub config: MetricsConfig,
    pub voxel_size: Option<f64>,
    pub divide_color_by_255: bool,
    pub output: Option<PathBuf>,
    pub mode: OutputMode,
}

/// Loads one cloud, runs the metric pass and appends the feature vectors to the
/// configured output.
pub fn extract_features(options: &ExtractOptions) -> Result<Vec<FeatureVector>, AppError> {
    let start = std::time::Instant::now();
    let point_cloud = read_point_cloud(&options.input)?;
    log::info!(
        "read {} points from {} in {:?}",
        point_cloud.len(),
        options.input.display(),
        start.elapsed()
    );

    let builder = PreprocessTransformBuilder::new(
        needs_color_rescale(&options.input, options.divide_color_by_255),
        options.voxel_size,
    );
    let point_cloud = PointCloudTransformer::from_builder(&builder)?.execute(point_cloud)?;

    let engine = MetricEngine::new(options.config.clone());
    engine.validate(&point_cloud)?;

    let start = std::time::Instant::now();
    let index = KdTreeIndex::from_point_cloud(&point_cloud);
    log::info!("built k-d tree in {:?}", start.elapsed());

    let start = std::time::Instant::now();
    let histograms = engine.run(&point_cloud, &index)?;
    log::info!(
        "labelled {} points in {:?}",
        histograms.point_count(),
        start.elapsed()
    );
    let vectors = histograms.normalize();

    match &options.output {
        Some(path) => {
            let writer = ResultWriter::new(path, options.mode);
            writer.write(&options.input.to_string_lossy(), &vectors)?;
        }
        None => log::warn!("no output path given; feature vectors are not written"),
    }

    Ok(vectors)
}
