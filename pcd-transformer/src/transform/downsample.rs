use pcd_core::pointcloud::{
    decimation::decimator::{PointCloudDecimator, VoxelDecimator},
    point::PointCloud,
};

use super::Transform;
use crate::TransformError;

pub struct VoxelDownsampleTransform {
    decimator: VoxelDecimator,
}

impl VoxelDownsampleTransform {
    pub fn new(voxel_size: f64) -> Result<Self, TransformError> {
        if !(voxel_size > 0.0 && voxel_size.is_finite()) {
            return Err(TransformError::InvalidVoxelSize(voxel_size));
        }
        Ok(Self {
            decimator: VoxelDecimator { voxel_size },
        })
    }

    pub fn voxel_size(&self) -> f64 {
        self.decimator.voxel_size
    }
}

impl Transform for VoxelDownsampleTransform {
    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError> {
        let before = point_cloud.len();
        let points = self.decimator.decimate(&point_cloud.points);
        log::info!(
            "voxel downsampling ({}): {} -> {} points",
            self.voxel_size(),
            before,
            points.len()
        );
        Ok(PointCloud::new(points, point_cloud.metadata.attributes))
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::{Attributes, Point};

    use super::*;

    #[test]
    fn rejects_non_positive_sizes() {
        assert!(VoxelDownsampleTransform::new(0.0).is_err());
        assert!(VoxelDownsampleTransform::new(-1.0).is_err());
        assert!(VoxelDownsampleTransform::new(f64::NAN).is_err());
    }

    #[test]
    fn keeps_attribute_flags() {
        let pc = PointCloud::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(0.2, 0.0, 0.0),
                Point::new(5.0, 0.0, 0.0),
            ],
            Attributes::ALL,
        );
        let out = VoxelDownsampleTransform::new(1.0)
            .unwrap()
            .transform(pc)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.has_colors() && out.has_normals());
        assert_eq!(out.metadata.point_count, 2);
    }
}
