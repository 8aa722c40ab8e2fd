use thiserror::Error;

use crate::catalog::MetricKind;

#[derive(Debug, Error)]
pub enum MetricError {
    #[error("at least one neighborhood size is required")]
    NoNeighborhood,
    #[error("at most {max} neighborhood sizes are supported, got {got}")]
    TooManyNeighborhoods { max: usize, got: usize },
    #[error("invalid neighborhood size '{0}': expected a positive integer")]
    InvalidNeighborhood(String),
    #[error("expected {expected} metric flags, got {got}")]
    MetricArity { expected: usize, got: usize },
    #[error("invalid metric flag '{0}': expected 0 or 1")]
    InvalidMetricFlag(String),
    #[error("point cloud is empty")]
    EmptyPointCloud,
    #[error("{metric} needs per-point {attribute}, which the point cloud does not carry")]
    MissingAttribute {
        metric: MetricKind,
        attribute: &'static str,
    },
    #[error("spatial index holds {index} points but the point cloud has {cloud}")]
    IndexMismatch { index: usize, cloud: usize },
}
