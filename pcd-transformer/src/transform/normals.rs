use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use rayon::prelude::*;

use pcd_core::pointcloud::{
    index::{KdTreeIndex, SpatialIndex},
    point::{Attributes, Normal, PointCloud},
};

use super::Transform;
use crate::{spacing::mean_neighbor_distance, TransformError};

/// Neighbors averaged to measure point spacing.
pub const SPACING_NEIGHBORS: usize = 8;
/// Search radius as a multiple of the point spacing.
pub const RADIUS_FACTOR: f64 = 6.0;
/// Upper bound on the neighbors (the point included) fitted per normal.
pub const MAX_NEIGHBORS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalEstimationParams {
    pub spacing_neighbors: usize,
    pub radius_factor: f64,
    pub max_neighbors: usize,
    /// Normals are flipped to have a non-negative component along this direction.
    pub orientation: [f64; 3],
}

impl Default for NormalEstimationParams {
    fn default() -> Self {
        Self {
            spacing_neighbors: SPACING_NEIGHBORS,
            radius_factor: RADIUS_FACTOR,
            max_neighbors: MAX_NEIGHBORS,
            orientation: [0.0, 0.0, 1.0],
        }
    }
}

/// Replaces the normals of a cloud with PCA estimates.
///
/// Each normal is the eigenvector of the smallest eigenvalue of the covariance
/// of the point's neighbors: at most `max_neighbors` points within
/// `radius_factor` times the mean spacing. Fewer than three neighbors give the
/// unit z vector.
pub struct NormalEstimationTransform {
    params: NormalEstimationParams,
}

impl NormalEstimationTransform {
    pub fn new(params: NormalEstimationParams) -> Self {
        Self { params }
    }
}

impl Default for NormalEstimationTransform {
    fn default() -> Self {
        Self::new(NormalEstimationParams::default())
    }
}

impl Transform for NormalEstimationTransform {
    fn transform(&self, mut point_cloud: PointCloud) -> Result<PointCloud, TransformError> {
        if point_cloud.is_empty() {
            return Err(TransformError::EmptyPointCloud);
        }

        let index = KdTreeIndex::from_point_cloud(&point_cloud);
        let spacing = mean_neighbor_distance(&index, self.params.spacing_neighbors);
        let radius = spacing * self.params.radius_factor;
        log::info!(
            "estimating normals: mean spacing {:.6}, search radius {:.6}",
            spacing,
            radius
        );

        let [ox, oy, oz] = self.params.orientation;
        let orientation = Normal::new(ox, oy, oz);
        let normals: Vec<Normal> = (0..index.len())
            .into_par_iter()
            .map(|i| {
                let normal = estimate_normal(&index, i, radius, self.params.max_neighbors);
                if normal.dot(&orientation) < 0.0 {
                    normal.flipped()
                } else {
                    normal
                }
            })
            .collect();

        for (point, normal) in point_cloud.points.iter_mut().zip(normals) {
            point.normal = normal;
        }
        point_cloud.metadata.attributes = Attributes {
            normals: true,
            ..point_cloud.metadata.attributes
        };
        Ok(point_cloud)
    }
}

fn estimate_normal<I: SpatialIndex>(index: &I, i: usize, radius: f64, max_neighbors: usize) -> Normal {
    let squared_radius = radius * radius;
    let neighbors: Vec<Vector3<f64>> = index
        .search_knn_of(i, max_neighbors)
        .into_iter()
        .filter(|n| n.squared_distance <= squared_radius)
        .map(|n| Vector3::from(index.position(n.index)))
        .collect();

    if neighbors.len() < 3 {
        return Normal::new(0.0, 0.0, 1.0);
    }

    let centroid = neighbors.iter().sum::<Vector3<f64>>() / neighbors.len() as f64;
    let mut covariance = Matrix3::zeros();
    for p in &neighbors {
        let diff = p - centroid;
        covariance += diff * diff.transpose();
    }

    let eigen = SymmetricEigen::new(covariance);
    let min_idx = eigen.eigenvalues.imin();
    let v = eigen.eigenvectors.column(min_idx);
    let norm = v.norm();
    if norm > 1e-12 {
        Normal::new(v[0] / norm, v[1] / norm, v[2] / norm)
    } else {
        Normal::new(0.0, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::Point;

    use super::*;

    fn plane(normal_axis: usize) -> PointCloud {
        let mut points = Vec::new();
        for u in 0..10 {
            for v in 0..10 {
                let mut p = [0.0; 3];
                p[(normal_axis + 1) % 3] = u as f64 * 0.1;
                p[(normal_axis + 2) % 3] = v as f64 * 0.1;
                points.push(Point::new(p[0], p[1], p[2]));
            }
        }
        PointCloud::new(points, Attributes::POSITIONS_ONLY)
    }

    #[test]
    fn horizontal_plane_normals_point_up() {
        let out = NormalEstimationTransform::default()
            .transform(plane(2))
            .unwrap();
        assert!(out.has_normals());
        for point in &out.points {
            assert!((point.normal.z - 1.0).abs() < 1e-6, "{:?}", point.normal);
        }
    }

    #[test]
    fn vertical_plane_normals_are_unit_and_axis_aligned() {
        let out = NormalEstimationTransform::default()
            .transform(plane(0))
            .unwrap();
        for point in &out.points {
            assert!((point.normal.length() - 1.0).abs() < 1e-9);
            assert!((point.normal.x.abs() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn sparse_neighborhoods_default_to_z() {
        let pc = PointCloud::new(
            vec![Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0)],
            Attributes::POSITIONS_ONLY,
        );
        let out = NormalEstimationTransform::default().transform(pc).unwrap();
        for point in &out.points {
            assert_eq!(point.normal, Normal::new(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn empty_cloud_is_rejected() {
        let pc = PointCloud::new(Vec::new(), Attributes::POSITIONS_ONLY);
        assert!(NormalEstimationTransform::default().transform(pc).is_err());
    }
}
