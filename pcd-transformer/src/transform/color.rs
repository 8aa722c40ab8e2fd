use pcd_core::pointcloud::point::PointCloud;

use super::Transform;
use crate::TransformError;

/// Divides every color channel by a constant, e.g. 255 for clouds whose colors
/// were stored as 8-bit integers but read as-is.
pub struct ColorScaleTransform {
    divisor: f64,
}

impl ColorScaleTransform {
    pub fn new(divisor: f64) -> Self {
        Self { divisor }
    }

    pub fn from_8bit() -> Self {
        Self::new(255.0)
    }
}

impl Transform for ColorScaleTransform {
    fn transform(&self, mut point_cloud: PointCloud) -> Result<PointCloud, TransformError> {
        let factor = 1.0 / self.divisor;
        for (_, _, _, point) in point_cloud.iter_mut() {
            point.color = point.color.scaled(factor);
        }
        Ok(point_cloud)
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::{Attributes, Color, Point};

    use super::*;

    #[test]
    fn scales_channels_into_unit_range() {
        let pc = PointCloud::new(
            vec![Point::new(0.0, 0.0, 0.0).with_color(Color::new(255.0, 51.0, 0.0))],
            Attributes::ALL,
        );
        let out = ColorScaleTransform::from_8bit().transform(pc).unwrap();
        let color = out.points[0].color;
        assert!((color.r - 1.0).abs() < 1e-12);
        assert!((color.g - 0.2).abs() < 1e-12);
        assert_eq!(color.b, 0.0);
    }
}
