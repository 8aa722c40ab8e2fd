use crate::{
    transform::{
        color::ColorScaleTransform, downsample::VoxelDownsampleTransform,
        normals::NormalEstimationTransform, CompositeTransform, Transform,
    },
    TransformError,
};

pub trait TransformBuilder {
    fn build(&self) -> Result<Box<dyn Transform>, TransformError>;
}

/// Preparation applied to a cloud before the metric pass: optional 8-bit color
/// rescaling followed by optional voxel downsampling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PreprocessTransformBuilder {
    pub scale_colors: bool,
    pub voxel_size: Option<f64>,
}

impl PreprocessTransformBuilder {
    pub fn new(scale_colors: bool, voxel_size: Option<f64>) -> Self {
        Self {
            scale_colors,
            voxel_size,
        }
    }
}

impl TransformBuilder for PreprocessTransformBuilder {
    fn build(&self) -> Result<Box<dyn Transform>, TransformError> {
        let mut transforms: Vec<Box<dyn Transform>> = Vec::new();
        if self.scale_colors {
            transforms.push(Box::new(ColorScaleTransform::from_8bit()));
        }
        if let Some(voxel_size) = self.voxel_size {
            transforms.push(Box::new(VoxelDownsampleTransform::new(voxel_size)?));
        }

        Ok(Box::new(CompositeTransform::new(transforms)))
    }
}

pub struct NormalEstimationTransformBuilder;

impl TransformBuilder for NormalEstimationTransformBuilder {
    fn build(&self) -> Result<Box<dyn Transform>, TransformError> {
        Ok(Box::new(NormalEstimationTransform::default()))
    }
}
