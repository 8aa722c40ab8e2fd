use std::path::PathBuf;

use pcd_parser::parsers::{provider_for, ParserProvider as _};

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("examples/data/sample.ply"));

    let parser = provider_for(&path).unwrap().get_parser();
    let point_cloud = parser.parse().unwrap();

    println!(
        "Number of points: {num_points}",
        num_points = point_cloud.points.len()
    );
    println!(
        "Attributes: colors={} normals={}",
        point_cloud.has_colors(),
        point_cloud.has_normals()
    );
    println!("First point: {:?}", point_cloud.points.first());
}
