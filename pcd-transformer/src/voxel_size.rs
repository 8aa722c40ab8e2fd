//! Heuristics for choosing a downsampling voxel size for a set of clouds.

use std::{fmt, str::FromStr};

use pcd_core::pointcloud::{
    decimation::decimator::{PointCloudDecimator, VoxelDecimator},
    index::KdTreeIndex,
    point::PointCloud,
};

use crate::{
    spacing::{mean_nearest_distance, mean_neighbor_distance},
    TransformError,
};

/// Neighbors averaged by [`VoxelSizeStrategy::KNearestMultiple`].
pub const SPACING_NEIGHBORS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoxelSizeStrategy {
    /// Smallest size, growing from the mean nearest-neighbor distance, that keeps
    /// at most `factor` of the points.
    Fraction,
    /// `factor` times the mean nearest-neighbor distance.
    NearestMultiple,
    /// `factor` times the mean distance to the 8 nearest neighbors.
    KNearestMultiple,
}

impl FromStr for VoxelSizeStrategy {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(VoxelSizeStrategy::Fraction),
            "2" => Ok(VoxelSizeStrategy::NearestMultiple),
            "3" => Ok(VoxelSizeStrategy::KNearestMultiple),
            other => Err(TransformError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for VoxelSizeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VoxelSizeStrategy::Fraction => "fraction of kept points",
            VoxelSizeStrategy::NearestMultiple => "multiple of mean NN distance",
            VoxelSizeStrategy::KNearestMultiple => "multiple of mean 8-NN distance",
        };
        f.write_str(name)
    }
}

/// Index of the cloud with the fewest points; the first wins on ties.
pub fn smallest_cloud(point_clouds: &[PointCloud]) -> Option<usize> {
    point_clouds
        .iter()
        .enumerate()
        .min_by_key(|(_, pc)| pc.len())
        .map(|(i, _)| i)
}

pub fn optimize_voxel_size(
    point_cloud: &PointCloud,
    strategy: VoxelSizeStrategy,
    factor: f64,
) -> Result<f64, TransformError> {
    if !(factor > 0.0 && factor.is_finite()) {
        return Err(TransformError::InvalidFactor(factor));
    }
    if point_cloud.is_empty() {
        return Err(TransformError::EmptyPointCloud);
    }

    let index = KdTreeIndex::from_point_cloud(point_cloud);
    match strategy {
        VoxelSizeStrategy::NearestMultiple => Ok(factor * mean_nearest_distance(&index)),
        VoxelSizeStrategy::KNearestMultiple => {
            Ok(factor * mean_neighbor_distance(&index, SPACING_NEIGHBORS))
        }
        VoxelSizeStrategy::Fraction => grow_until_fraction(point_cloud, &index, factor),
    }
}

fn grow_until_fraction(
    point_cloud: &PointCloud,
    index: &KdTreeIndex,
    factor: f64,
) -> Result<f64, TransformError> {
    let point_count = point_cloud.len();
    let target = point_count as f64 * factor;
    if target < 1.0 {
        return Err(TransformError::UnreachableTarget {
            factor,
            points: point_count,
        });
    }

    let base = mean_nearest_distance(index);
    if target >= point_count as f64 {
        return Ok(base);
    }
    if !(base > 0.0) {
        return Err(TransformError::DegenerateSpacing(base));
    }

    let step = base / 4.0;
    let mut voxel_size = base;
    let mut kept = point_count;
    while kept as f64 > target {
        voxel_size += step;
        kept = VoxelDecimator { voxel_size }
            .decimate(&point_cloud.points)
            .len();
        log::debug!("voxel size {:.16} keeps {} points", voxel_size, kept);
    }
    Ok(voxel_size)
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::{Attributes, Point};

    use super::*;

    fn grid(n: usize, spacing: f64) -> PointCloud {
        let mut points = Vec::new();
        for x in 0..n {
            for y in 0..n {
                points.push(Point::new(x as f64 * spacing, y as f64 * spacing, 0.0));
            }
        }
        PointCloud::new(points, Attributes::POSITIONS_ONLY)
    }

    #[test]
    fn parses_strategy_numbers() {
        assert_eq!("1".parse::<VoxelSizeStrategy>().unwrap(), VoxelSizeStrategy::Fraction);
        assert_eq!(
            "3".parse::<VoxelSizeStrategy>().unwrap(),
            VoxelSizeStrategy::KNearestMultiple
        );
        assert!("4".parse::<VoxelSizeStrategy>().is_err());
    }

    #[test]
    fn nearest_multiple_scales_spacing() {
        let size = optimize_voxel_size(&grid(5, 0.5), VoxelSizeStrategy::NearestMultiple, 2.0).unwrap();
        assert!((size - 1.0).abs() < 1e-12);
    }

    #[test]
    fn knearest_multiple_exceeds_nearest_multiple() {
        let pc = grid(6, 1.0);
        let nn = optimize_voxel_size(&pc, VoxelSizeStrategy::NearestMultiple, 1.0).unwrap();
        let knn = optimize_voxel_size(&pc, VoxelSizeStrategy::KNearestMultiple, 1.0).unwrap();
        assert!(knn > nn);
    }

    #[test]
    fn fraction_reaches_target_point_count() {
        let pc = grid(10, 1.0);
        let size = optimize_voxel_size(&pc, VoxelSizeStrategy::Fraction, 0.5).unwrap();
        assert!(size > 1.0);
        let kept = VoxelDecimator { voxel_size: size }.decimate(&pc.points).len();
        assert!(kept <= 50);
        // one step smaller keeps too many
        let previous = VoxelDecimator {
            voxel_size: size - 0.25,
        }
        .decimate(&pc.points)
        .len();
        assert!(size - 0.25 <= 1.0 || previous > 50);
    }

    #[test]
    fn rejects_unusable_inputs() {
        let pc = grid(3, 1.0);
        assert!(optimize_voxel_size(&pc, VoxelSizeStrategy::Fraction, 0.0).is_err());
        assert!(optimize_voxel_size(&pc, VoxelSizeStrategy::Fraction, 0.01).is_err());

        let stacked = PointCloud::new(
            vec![Point::new(0.0, 0.0, 0.0), Point::new(0.0, 0.0, 0.0)],
            Attributes::POSITIONS_ONLY,
        );
        assert!(matches!(
            optimize_voxel_size(&stacked, VoxelSizeStrategy::Fraction, 0.5),
            Err(TransformError::DegenerateSpacing(_))
        ));
    }

    #[test]
    fn picks_smallest_cloud() {
        let clouds = vec![grid(4, 1.0), grid(2, 1.0), grid(2, 0.5)];
        assert_eq!(smallest_cloud(&clouds), Some(1));
        assert_eq!(smallest_cloud(&[]), None);
    }
}
