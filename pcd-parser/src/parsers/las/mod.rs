use std::path::PathBuf;

use las::Reader;

use pcd_core::pointcloud::point::{Attributes, Color, Point, PointCloud};

use super::{Parser, ParserProvider};
use crate::ParseError;

pub struct LasParserProvider {
    pub filename: PathBuf,
}

impl ParserProvider for LasParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(LasParser {
            filename: self.filename.clone(),
        })
    }
}

/// Upper bound on the up-front reservation; the header count is not trusted.
const MAX_RESERVED_POINTS: usize = 1 << 20;

/// LAS/LAZ carry positions and optional 16-bit colors but never normals.
pub struct LasParser {
    pub filename: PathBuf,
}

impl Parser for LasParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let mut reader = Reader::from_path(&self.filename)?;
        let has_colors = reader.header().point_format().has_color;

        let declared = reader.header().number_of_points() as usize;
        let mut points = Vec::with_capacity(declared.min(MAX_RESERVED_POINTS));
        for las_point in reader.points() {
            let las_point = las_point?;

            let color = las_point
                .color
                .map(|c| {
                    Color::new(
                        c.red as f64 / 65535.0,
                        c.green as f64 / 65535.0,
                        c.blue as f64 / 65535.0,
                    )
                })
                .unwrap_or_default();

            points.push(Point::new(las_point.x, las_point.y, las_point.z).with_color(color));
        }

        Ok(PointCloud::new(
            points,
            Attributes {
                colors: has_colors,
                normals: false,
            },
        ))
    }
}
