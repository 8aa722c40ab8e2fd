use std::io::Write;

use pcd_core::pointcloud::point::PointCloud;

use super::PointCloudWriter;
use crate::ExportError;

/// CSV with a header row; colors stay in the `[0, 1]` range.
pub struct CsvWriter;

impl PointCloudWriter for CsvWriter {
    fn write(&self, point_cloud: &PointCloud, out: &mut dyn Write) -> Result<(), ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(out);

        let normals = point_cloud.has_normals();
        let colors = point_cloud.has_colors();

        let mut header = vec!["x", "y", "z"];
        if colors {
            header.extend(["r", "g", "b"]);
        }
        if normals {
            header.extend(["nx", "ny", "nz"]);
        }
        writer.write_record(&header)?;

        for (x, y, z, point) in point_cloud.iter() {
            let mut record = vec![x, y, z];
            if colors {
                record.extend([point.color.r, point.color.g, point.color.b]);
            }
            if normals {
                record.extend([point.normal.x, point.normal.y, point.normal.z]);
            }
            writer.write_record(record.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::{Attributes, Color, Point};

    use super::*;

    #[test]
    fn header_follows_attributes() {
        let pc = PointCloud::new(
            vec![Point::new(0.5, 1.0, 2.0).with_color(Color::new(0.25, 0.5, 1.0))],
            Attributes {
                colors: true,
                normals: false,
            },
        );
        let mut out = Vec::new();
        CsvWriter.write(&pc, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "x,y,z,r,g,b\n0.5,1,2,0.25,0.5,1\n"
        );
    }
}
