use std::{io::BufRead, path::PathBuf};

use pcd_core::pointcloud::point::{Attributes, Color, Normal, Point, PointCloud};

use super::{open_buffered, Parser, ParserProvider};
use crate::ParseError;

/// Column layout of the whitespace-separated text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XyzLayout {
    /// `x y z`
    Positions,
    /// `x y z nx ny nz`
    PositionsNormals,
    /// `x y z r g b`, colors stored as written (no rescaling here)
    PositionsColors,
}

impl XyzLayout {
    fn columns(&self) -> usize {
        match self {
            XyzLayout::Positions => 3,
            XyzLayout::PositionsNormals | XyzLayout::PositionsColors => 6,
        }
    }

    fn attributes(&self) -> Attributes {
        match self {
            XyzLayout::Positions => Attributes::POSITIONS_ONLY,
            XyzLayout::PositionsNormals => Attributes {
                colors: false,
                normals: true,
            },
            XyzLayout::PositionsColors => Attributes {
                colors: true,
                normals: false,
            },
        }
    }
}

pub struct XyzParserProvider {
    pub filename: PathBuf,
    pub layout: XyzLayout,
}

impl ParserProvider for XyzParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(XyzParser {
            filename: self.filename.clone(),
            layout: self.layout,
        })
    }
}

pub struct XyzParser {
    pub filename: PathBuf,
    pub layout: XyzLayout,
}

impl Parser for XyzParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let reader = open_buffered(&self.filename)?;
        read_xyz(reader, self.layout)
    }
}

pub fn read_xyz<R: BufRead>(reader: R, layout: XyzLayout) -> Result<PointCloud, ParseError> {
    let columns = layout.columns();
    let mut points = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        let values = content
            .split_whitespace()
            .take(columns)
            .map(|token| token.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| {
                ParseError::malformed(format!("line {}: {}", line_number + 1, e))
            })?;
        if values.len() < columns {
            return Err(ParseError::malformed(format!(
                "line {}: expected {} values, found {}",
                line_number + 1,
                columns,
                values.len()
            )));
        }

        let point = Point::new(values[0], values[1], values[2]);
        let point = match layout {
            XyzLayout::Positions => point,
            XyzLayout::PositionsNormals => {
                point.with_normal(Normal::new(values[3], values[4], values[5]))
            }
            XyzLayout::PositionsColors => {
                point.with_color(Color::new(values[3], values[4], values[5]))
            }
        };
        points.push(point);
    }

    Ok(PointCloud::new(points, layout.attributes()))
}
