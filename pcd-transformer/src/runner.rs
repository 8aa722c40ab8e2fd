use pcd_core::pointcloud::point::PointCloud;

use crate::{builder::TransformBuilder, transform::Transform, TransformError};

pub trait Transformer {
    fn execute(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError>;
}

pub struct PointCloudTransformer {
    transform: Box<dyn Transform>,
}

impl PointCloudTransformer {
    pub fn new(transform: Box<dyn Transform>) -> Self {
        Self { transform }
    }

    pub fn from_builder(builder: &dyn TransformBuilder) -> Result<Self, TransformError> {
        Ok(Self::new(builder.build()?))
    }
}

impl Transformer for PointCloudTransformer {
    fn execute(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError> {
        self.transform.transform(point_cloud)
    }
}
