use pcd_core::pointcloud::point::{Attributes, Color, Normal, Point, PointCloud};
use pcd_exporter::{
    write_point_cloud,
    writers::{
        ply::{PlyEncoding, PlyWriter},
        PointCloudWriter as _,
    },
};
use pcd_parser::read_point_cloud;

fn cloud() -> PointCloud {
    PointCloud::new(
        vec![
            Point::new(0.0, 0.0, 0.0)
                .with_color(Color::new(1.0, 0.0, 0.0))
                .with_normal(Normal::new(0.0, 0.0, 1.0)),
            Point::new(1.25, -3.5, 8.0)
                .with_color(Color::new(0.0, 1.0, 0.0))
                .with_normal(Normal::new(1.0, 0.0, 0.0)),
        ],
        Attributes::ALL,
    )
}

#[test]
fn ascii_ply_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cloud.ply");
    write_point_cloud(&path, &cloud()).unwrap();

    let back = read_point_cloud(&path).unwrap();
    assert_eq!(back.len(), 2);
    assert!(back.has_colors() && back.has_normals());
    assert_eq!(back.positions(), cloud().positions());
    assert_eq!(back.points[1].normal, Normal::new(1.0, 0.0, 0.0));
    assert_eq!(back.points[1].color, Color::new(0.0, 1.0, 0.0));
}

#[test]
fn binary_ply_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cloud.ply");
    let mut file = std::fs::File::create(&path).unwrap();
    PlyWriter::new(PlyEncoding::BinaryLittleEndian)
        .write(&cloud(), &mut file)
        .unwrap();
    drop(file);

    let back = read_point_cloud(&path).unwrap();
    assert_eq!(back.positions(), cloud().positions());
    assert_eq!(back.points[0].color, Color::new(1.0, 0.0, 0.0));
}

#[test]
fn csv_and_xyzn_read_back() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["cloud.csv", "cloud.xyzn"] {
        let path = dir.path().join(name);
        write_point_cloud(&path, &cloud()).unwrap();
        let back = read_point_cloud(&path).unwrap();
        assert_eq!(back.positions(), cloud().positions());
        assert!(back.has_normals());
        assert_eq!(back.points[0].normal, Normal::new(0.0, 0.0, 1.0));
    }
}
