use std::{collections::HashMap, path::PathBuf};

use csv::ReaderBuilder;

use pcd_core::pointcloud::point::{Attributes, Color, Normal, Point, PointCloud};

use super::{Parser, ParserProvider};
use crate::ParseError;

pub struct CsvParserProvider {
    pub filename: PathBuf,
}

impl ParserProvider for CsvParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(CsvParser {
            filename: self.filename.clone(),
        })
    }
}

/// Delimited text with a header row naming the columns. Colors are taken as
/// written; pass them through the color normalizer if they use 0..255.
pub struct CsvParser {
    pub filename: PathBuf,
}

impl Parser for CsvParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.filename)?;
        read_csv(reader)
    }
}

const ATTRIBUTE_NAMES: [&str; 15] = [
    "x", "y", "z", "r", "g", "b", "red", "green", "blue", "nx", "ny", "nz", "normal_x",
    "normal_y", "normal_z",
];

pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<PointCloud, ParseError> {
    let headers = reader.headers()?.clone();
    let field_mapping = create_field_mapping(&headers)?;

    let has_all = |names: [[&str; 2]; 3]| {
        names
            .iter()
            .all(|alts| alts.iter().any(|n| field_mapping.contains_key(*n)))
    };
    let attributes = Attributes {
        colors: has_all([["r", "red"], ["g", "green"], ["b", "blue"]]),
        normals: has_all([["nx", "normal_x"], ["ny", "normal_y"], ["nz", "normal_z"]]),
    };

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;

        let x = parse_required_field(&record, &field_mapping, "x")?;
        let y = parse_required_field(&record, &field_mapping, "y")?;
        let z = parse_required_field(&record, &field_mapping, "z")?;

        let mut point = Point::new(x, y, z);
        if attributes.colors {
            point.color = Color::new(
                parse_either(&record, &field_mapping, "r", "red")?,
                parse_either(&record, &field_mapping, "g", "green")?,
                parse_either(&record, &field_mapping, "b", "blue")?,
            );
        }
        if attributes.normals {
            point.normal = Normal::new(
                parse_either(&record, &field_mapping, "nx", "normal_x")?,
                parse_either(&record, &field_mapping, "ny", "normal_y")?,
                parse_either(&record, &field_mapping, "nz", "normal_z")?,
            );
        }
        points.push(point);
    }

    Ok(PointCloud::new(points, attributes))
}

fn create_field_mapping(headers: &csv::StringRecord) -> Result<HashMap<String, usize>, ParseError> {
    let mut mapping = HashMap::new();

    for (index, header) in headers.iter().enumerate() {
        let normalized_header = header.to_lowercase().replace(['_', '-'], "");

        for attr_name in &ATTRIBUTE_NAMES {
            let normalized_attr = attr_name.replace(['_', '-'], "");
            if normalized_header == normalized_attr {
                mapping.insert(attr_name.to_string(), index);
                break;
            }
        }
    }

    for attr_name in &["x", "y", "z"] {
        if !mapping.contains_key(*attr_name) {
            return Err(ParseError::malformed(format!(
                "Required attribute '{}' is missing in CSV headers.",
                attr_name
            )));
        }
    }

    Ok(mapping)
}

fn get_field_value<'a>(
    record: &'a csv::StringRecord,
    field_mapping: &HashMap<String, usize>,
    field_name: &str,
) -> Option<&'a str> {
    field_mapping
        .get(field_name)
        .and_then(|&index| record.get(index))
        .filter(|value| !value.is_empty())
}

fn parse_required_field(
    record: &csv::StringRecord,
    field_mapping: &HashMap<String, usize>,
    field_name: &str,
) -> Result<f64, ParseError> {
    let value = get_field_value(record, field_mapping, field_name)
        .ok_or_else(|| ParseError::malformed(format!("Missing '{}' field", field_name)))?;
    value
        .parse()
        .map_err(|e| ParseError::malformed(format!("Failed to parse '{}': {}", field_name, e)))
}

fn parse_either(
    record: &csv::StringRecord,
    field_mapping: &HashMap<String, usize>,
    short: &str,
    long: &str,
) -> Result<f64, ParseError> {
    if get_field_value(record, field_mapping, short).is_some() {
        parse_required_field(record, field_mapping, short)
    } else {
        parse_required_field(record, field_mapping, long)
    }
}
