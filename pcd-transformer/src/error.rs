use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("voxel size must be positive, got {0}")]
    InvalidVoxelSize(f64),
    #[error("voxel-size factor must be positive, got {0}")]
    InvalidFactor(f64),
    #[error("unknown voxel-size strategy: {0} (expected 1, 2 or 3)")]
    UnknownStrategy(String),
    #[error("point cloud is empty")]
    EmptyPointCloud,
    #[error("points have no spacing to grow a voxel from (mean nearest-neighbor distance is {0})")]
    DegenerateSpacing(f64),
    #[error("fraction {factor} of {points} points leaves nothing to keep")]
    UnreachableTarget { factor: f64, points: usize },
}
