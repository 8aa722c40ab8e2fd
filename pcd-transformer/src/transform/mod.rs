use pcd_core::pointcloud::point::PointCloud;

use crate::TransformError;

pub mod color;
pub mod downsample;
pub mod normals;

pub trait Transform {
    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError>;
}

pub struct CompositeTransform {
    transforms: Vec<Box<dyn Transform>>,
}

impl CompositeTransform {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Transform for CompositeTransform {
    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError> {
        let mut intermediate = point_cloud;

        for transform in &self.transforms {
            intermediate = transform.transform(intermediate)?;
        }

        Ok(intermediate)
    }
}
