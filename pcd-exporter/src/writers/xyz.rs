use std::io::Write;

use pcd_core::pointcloud::point::PointCloud;

use super::PointCloudWriter;
use crate::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XyzColumns {
    Positions,
    PositionsNormals,
    /// Colors are written on the 0..255 scale.
    PositionsColors,
}

pub struct XyzWriter {
    columns: XyzColumns,
}

impl XyzWriter {
    pub fn new(columns: XyzColumns) -> Self {
        Self { columns }
    }
}

impl PointCloudWriter for XyzWriter {
    fn write(&self, point_cloud: &PointCloud, out: &mut dyn Write) -> Result<(), ExportError> {
        for (x, y, z, point) in point_cloud.iter() {
            match self.columns {
                XyzColumns::Positions => writeln!(out, "{} {} {}", x, y, z)?,
                XyzColumns::PositionsNormals => {
                    let n = point.normal;
                    writeln!(out, "{} {} {} {} {} {}", x, y, z, n.x, n.y, n.z)?
                }
                XyzColumns::PositionsColors => {
                    let [r, g, b] = point.color.to_rgb255();
                    writeln!(out, "{} {} {} {} {} {}", x, y, z, r, g, b)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::{Attributes, Color, Normal, Point};

    use super::*;

    #[test]
    fn column_layouts() {
        let pc = PointCloud::new(
            vec![Point::new(1.0, 2.0, 3.0)
                .with_color(Color::new(1.0, 0.0, 0.0))
                .with_normal(Normal::new(0.0, -1.0, 0.0))],
            Attributes::ALL,
        );
        let render = |columns| {
            let mut out = Vec::new();
            XyzWriter::new(columns).write(&pc, &mut out).unwrap();
            String::from_utf8(out).unwrap()
        };
        assert_eq!(render(XyzColumns::Positions), "1 2 3\n");
        assert_eq!(render(XyzColumns::PositionsNormals), "1 2 3 0 -1 0\n");
        assert_eq!(render(XyzColumns::PositionsColors), "1 2 3 255 0 0\n");
    }
}
