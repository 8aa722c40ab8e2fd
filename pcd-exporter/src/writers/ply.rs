use std::io::Write;

use pcd_core::pointcloud::point::PointCloud;
use ply_rs::{
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer,
};

use super::PointCloudWriter;
use crate::ExportError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlyEncoding {
    #[default]
    Ascii,
    BinaryLittleEndian,
}

impl From<PlyEncoding> for Encoding {
    fn from(encoding: PlyEncoding) -> Self {
        match encoding {
            PlyEncoding::Ascii => Encoding::Ascii,
            PlyEncoding::BinaryLittleEndian => Encoding::BinaryLittleEndian,
        }
    }
}

/// PLY with double positions, double normals and uchar colors, each attribute
/// group present only when the cloud carries it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlyWriter {
    pub encoding: PlyEncoding,
}

impl PlyWriter {
    pub fn new(encoding: PlyEncoding) -> Self {
        Self { encoding }
    }

    fn vertex_def(point_cloud: &PointCloud) -> ElementDef {
        let mut vertex = ElementDef::new("vertex".to_string());
        let mut add = |name: &str, scalar: ScalarType| {
            vertex
                .properties
                .add(PropertyDef::new(name.to_string(), PropertyType::Scalar(scalar)));
        };
        for name in ["x", "y", "z"] {
            add(name, ScalarType::Double);
        }
        if point_cloud.has_normals() {
            for name in ["nx", "ny", "nz"] {
                add(name, ScalarType::Double);
            }
        }
        if point_cloud.has_colors() {
            for name in ["red", "green", "blue"] {
                add(name, ScalarType::UChar);
            }
        }
        vertex
    }

    fn build(&self, point_cloud: &PointCloud) -> Ply<DefaultElement> {
        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = self.encoding.into();
        ply.header.elements.add(Self::vertex_def(point_cloud));

        let normals = point_cloud.has_normals();
        let colors = point_cloud.has_colors();
        let vertices = point_cloud
            .iter()
            .map(|(x, y, z, point)| {
                let mut vertex = DefaultElement::new();
                vertex.insert("x".to_string(), Property::Double(x));
                vertex.insert("y".to_string(), Property::Double(y));
                vertex.insert("z".to_string(), Property::Double(z));
                if normals {
                    let n = point.normal;
                    vertex.insert("nx".to_string(), Property::Double(n.x));
                    vertex.insert("ny".to_string(), Property::Double(n.y));
                    vertex.insert("nz".to_string(), Property::Double(n.z));
                }
                if colors {
                    let [r, g, b] = point.color.to_rgb8();
                    vertex.insert("red".to_string(), Property::UChar(r));
                    vertex.insert("green".to_string(), Property::UChar(g));
                    vertex.insert("blue".to_string(), Property::UChar(b));
                }
                vertex
            })
            .collect();
        ply.payload.insert("vertex".to_string(), vertices);
        ply
    }
}

impl PointCloudWriter for PlyWriter {
    fn write(&self, point_cloud: &PointCloud, mut out: &mut dyn Write) -> Result<(), ExportError> {
        let mut ply = self.build(point_cloud);
        Writer::<DefaultElement>::new().write_ply(&mut out, &mut ply)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::{Attributes, Color, Normal, Point};

    use super::*;

    fn cloud() -> PointCloud {
        PointCloud::new(
            vec![Point::new(1.5, -2.0, 0.25)
                .with_color(Color::new(1.0, 0.0, 0.5))
                .with_normal(Normal::new(0.0, 0.0, 1.0))],
            Attributes::ALL,
        )
    }

    fn header_and_body(out: &[u8]) -> (String, &[u8]) {
        let marker = b"end_header\n";
        let end = out
            .windows(marker.len())
            .position(|w| w == marker)
            .unwrap()
            + marker.len();
        (String::from_utf8(out[..end].to_vec()).unwrap(), &out[end..])
    }

    #[test]
    fn ascii_layout() {
        let mut out = Vec::new();
        PlyWriter::default().write(&cloud(), &mut out).unwrap();
        let (header, body) = header_and_body(&out);
        assert!(header.starts_with("ply\nformat ascii 1.0\n"));
        assert!(header.contains("element vertex 1\n"));
        assert!(header.contains("property double nx\n"));
        assert!(header.contains("property uchar red\n"));

        let body = std::str::from_utf8(body).unwrap();
        let values: Vec<f64> = body.split_whitespace().map(|v| v.parse().unwrap()).collect();
        assert_eq!(values, vec![1.5, -2.0, 0.25, 0.0, 0.0, 1.0, 255.0, 0.0, 128.0]);
    }

    #[test]
    fn binary_body_size() {
        let mut out = Vec::new();
        PlyWriter::new(PlyEncoding::BinaryLittleEndian)
            .write(&cloud(), &mut out)
            .unwrap();
        let (header, body) = header_and_body(&out);
        assert!(header.contains("format binary_little_endian 1.0\n"));
        assert_eq!(body.len(), 6 * 8 + 3);
    }

    #[test]
    fn attribute_groups_follow_the_cloud() {
        let bare = PointCloud::new(vec![Point::new(0.0, 0.0, 0.0)], Attributes::default());
        let mut out = Vec::new();
        PlyWriter::default().write(&bare, &mut out).unwrap();
        let (header, _) = header_and_body(&out);
        assert!(!header.contains("nx"));
        assert!(!header.contains("red"));
    }
}
