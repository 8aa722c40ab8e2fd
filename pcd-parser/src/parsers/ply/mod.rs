use std::{io::BufRead, path::PathBuf};

use ply_rs::{
    parser::Parser as PlyReader,
    ply::{DefaultElement, ElementDef, Header, Property},
};

use pcd_core::pointcloud::point::{Attributes, Color, Normal, Point, PointCloud};

use super::{open_buffered, Parser, ParserProvider};
use crate::ParseError;

const X: &[&str] = &["x"];
const Y: &[&str] = &["y"];
const Z: &[&str] = &["z"];
const NX: &[&str] = &["nx", "normal_x"];
const NY: &[&str] = &["ny", "normal_y"];
const NZ: &[&str] = &["nz", "normal_z"];
const RED: &[&str] = &["red", "r", "diffuse_red"];
const GREEN: &[&str] = &["green", "g", "diffuse_green"];
const BLUE: &[&str] = &["blue", "b", "diffuse_blue"];

pub struct PlyParserProvider {
    pub filename: PathBuf,
}

impl ParserProvider for PlyParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(PlyParser {
            filename: self.filename.clone(),
        })
    }
}

pub struct PlyParser {
    pub filename: PathBuf,
}

impl Parser for PlyParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let byte_len = std::fs::metadata(&self.filename)
            .map_err(|e| ParseError::io(&self.filename, e))?
            .len();
        let mut reader = open_buffered(&self.filename)?;
        read_ply(&mut reader, byte_len)
    }
}

/// Property names of the vertex element actually present in the header.
struct VertexLayout {
    position: [String; 3],
    normal: Option<[String; 3]>,
    color: Option<[String; 3]>,
}

impl VertexLayout {
    fn new(vertex: &ElementDef) -> Result<Self, ParseError> {
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find(|name| vertex.properties.contains_key(**name))
                .map(|name| name.to_string())
        };
        let triple = |a, b, c| match (find(a), find(b), find(c)) {
            (Some(a), Some(b), Some(c)) => Some([a, b, c]),
            _ => None,
        };

        let position = triple(X, Y, Z)
            .ok_or_else(|| ParseError::malformed("vertex element lacks x/y/z properties"))?;
        Ok(Self {
            position,
            normal: triple(NX, NY, NZ),
            color: triple(RED, GREEN, BLUE),
        })
    }

    fn attributes(&self) -> Attributes {
        Attributes {
            colors: self.color.is_some(),
            normals: self.normal.is_some(),
        }
    }
}

/// Every element instance with at least one property takes at least one byte in
/// either encoding, so larger counts cannot be backed by the stream.
fn check_counts(header: &Header, byte_len: u64) -> Result<(), ParseError> {
    for (name, element) in &header.elements {
        if !element.properties.is_empty() && element.count as u64 > byte_len {
            return Err(ParseError::malformed(format!(
                "element '{}' claims {} entries but the file holds {} bytes",
                name, element.count, byte_len
            )));
        }
    }
    Ok(())
}

fn number(element: &DefaultElement, name: &str) -> Result<f64, ParseError> {
    match element.get(name) {
        Some(Property::Char(v)) => Ok(*v as f64),
        Some(Property::UChar(v)) => Ok(*v as f64),
        Some(Property::Short(v)) => Ok(*v as f64),
        Some(Property::UShort(v)) => Ok(*v as f64),
        Some(Property::Int(v)) => Ok(*v as f64),
        Some(Property::UInt(v)) => Ok(*v as f64),
        Some(Property::Float(v)) => Ok(*v as f64),
        Some(Property::Double(v)) => Ok(*v),
        Some(_) => Err(ParseError::malformed(format!(
            "property '{}' is a list, expected a scalar",
            name
        ))),
        None => Err(ParseError::malformed(format!("vertex lacks property '{}'", name))),
    }
}

/// Color channel in `[0, 1]`: unsigned integers are divided by their type
/// maximum, floats are taken as-is. Signed and 32-bit integer colors are
/// rejected.
fn channel(element: &DefaultElement, name: &str) -> Result<f64, ParseError> {
    match element.get(name) {
        Some(Property::UChar(v)) => Ok(*v as f64 / 255.0),
        Some(Property::UShort(v)) => Ok(*v as f64 / 65535.0),
        Some(Property::Float(v)) => Ok(*v as f64),
        Some(Property::Double(v)) => Ok(*v),
        Some(other) => Err(ParseError::malformed(format!(
            "unsupported color type for '{}': {:?}",
            name, other
        ))),
        None => Err(ParseError::malformed(format!("vertex lacks property '{}'", name))),
    }
}

fn triple<F>(element: &DefaultElement, names: &[String; 3], read: F) -> Result<[f64; 3], ParseError>
where
    F: Fn(&DefaultElement, &str) -> Result<f64, ParseError>,
{
    Ok([
        read(element, &names[0])?,
        read(element, &names[1])?,
        read(element, &names[2])?,
    ])
}

/// Reads the `vertex` element of a PLY stream of `byte_len` bytes; other
/// elements are parsed and dropped.
pub fn read_ply<R: BufRead>(reader: &mut R, byte_len: u64) -> Result<PointCloud, ParseError> {
    let parser = PlyReader::<DefaultElement>::new();
    let header = parser
        .read_header(reader)
        .map_err(|e| ParseError::malformed(format!("PLY header: {}", e)))?;
    check_counts(&header, byte_len)?;

    let vertex = header
        .elements
        .get("vertex")
        .ok_or_else(|| ParseError::malformed("PLY file has no vertex element"))?;
    let layout = VertexLayout::new(vertex)?;

    let payload = parser
        .read_payload(reader, &header)
        .map_err(|e| ParseError::malformed(format!("PLY body: {}", e)))?;
    let vertices = payload.get("vertex").map(Vec::as_slice).unwrap_or_default();

    let points = vertices
        .iter()
        .map(|element| {
            let [x, y, z] = triple(element, &layout.position, number)?;
            let mut point = Point::new(x, y, z);
            if let Some(names) = &layout.normal {
                let [nx, ny, nz] = triple(element, names, number)?;
                point.normal = Normal::new(nx, ny, nz);
            }
            if let Some(names) = &layout.color {
                let [r, g, b] = triple(element, names, channel)?;
                point.color = Color::new(r, g, b);
            }
            Ok(point)
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok(PointCloud::new(points, layout.attributes()))
}
