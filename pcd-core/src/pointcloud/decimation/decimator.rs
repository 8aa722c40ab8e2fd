use std::collections::BTreeMap;

use crate::pointcloud::point::{Color, Normal, Point};

pub trait PointCloudDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point>;
}

/// Collapses every occupied cell of a regular grid into the mean of its members.
///
/// The grid is anchored half a voxel below the minimum bound so that the first
/// point on every axis sits at the center of its cell. Normals are averaged and
/// re-normalized. Output is ordered by cell index, so the result does not depend
/// on hashing.
pub struct VoxelDecimator {
    pub voxel_size: f64,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    position: [f64; 3],
    color: [f64; 3],
    normal: [f64; 3],
}

impl Accumulator {
    fn add(&mut self, point: &Point) {
        self.count += 1;
        self.position[0] += point.x;
        self.position[1] += point.y;
        self.position[2] += point.z;
        self.color[0] += point.color.r;
        self.color[1] += point.color.g;
        self.color[2] += point.color.b;
        self.normal[0] += point.normal.x;
        self.normal[1] += point.normal.y;
        self.normal[2] += point.normal.z;
    }

    fn average(&self) -> Point {
        let n = self.count as f64;
        Point {
            x: self.position[0] / n,
            y: self.position[1] / n,
            z: self.position[2] / n,
            color: Color::new(self.color[0] / n, self.color[1] / n, self.color[2] / n),
            normal: Normal::new(self.normal[0] / n, self.normal[1] / n, self.normal[2] / n)
                .normalized(),
        }
    }
}

impl PointCloudDecimator for VoxelDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point> {
        if points.is_empty() {
            return Vec::new();
        }

        let voxel_size = self.voxel_size;
        let origin = self.grid_origin(points, voxel_size);
        let mut cells: BTreeMap<(i64, i64, i64), Accumulator> = BTreeMap::new();

        for point in points {
            let index = self.get_voxel_index(point, origin, voxel_size);
            cells.entry(index).or_default().add(point);
        }

        cells.values().map(Accumulator::average).collect()
    }
}

impl VoxelDecimator {
    fn grid_origin(&self, points: &[Point], voxel_size: f64) -> [f64; 3] {
        let mut min = [f64::MAX; 3];
        for point in points {
            min[0] = min[0].min(point.x);
            min[1] = min[1].min(point.y);
            min[2] = min[2].min(point.z);
        }
        let half = voxel_size * 0.5;
        [min[0] - half, min[1] - half, min[2] - half]
    }

    fn get_voxel_index(&self, point: &Point, origin: [f64; 3], voxel_size: f64) -> (i64, i64, i64) {
        let x_idx = ((point.x - origin[0]) / voxel_size).floor() as i64;
        let y_idx = ((point.y - origin[1]) / voxel_size).floor() as i64;
        let z_idx = ((point.z - origin[2]) / voxel_size).floor() as i64;
        (x_idx, y_idx, z_idx)
    }
}
