/// RGB color with every channel in the canonical `[0, 1]` range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
        }
    }

    /// Channels rescaled to the 0..255 convention used by color-difference formulas.
    pub fn to_rgb255(&self) -> [f64; 3] {
        [self.r * 255.0, self.g * 255.0, self.b * 255.0]
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.r * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.g * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.b * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }
}

/// Surface normal. Expected to be of unit length once estimated, but nothing
/// here enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Normal {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Normal {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit-length copy. The zero vector is returned unchanged.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len, self.z / len)
        } else {
            *self
        }
    }

    /// Straight-line distance between the two vectors' tips.
    pub fn distance(&self, other: &Normal) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }

    pub fn dot(&self, other: &Normal) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn flipped(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub color: Color,
    pub normal: Normal,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_normal(mut self, normal: Normal) -> Self {
        self.normal = normal;
        self
    }

    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn squared_distance(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)
    }
}

/// Which per-point attributes the source actually carried. Points always hold a
/// color and a normal; for absent attributes those are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes {
    pub colors: bool,
    pub normals: bool,
}

impl Attributes {
    pub const POSITIONS_ONLY: Attributes = Attributes {
        colors: false,
        normals: false,
    };

    pub const ALL: Attributes = Attributes {
        colors: true,
        normals: true,
    };
}

#[derive(Debug, Clone)]
pub struct PointCloud {
    pub points: Vec<Point>,
    pub metadata: Metadata,
}

impl PointCloud {
    pub fn new(points: Vec<Point>, attributes: Attributes) -> Self {
        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };

        for point in &points {
            bounding_volume.max[0] = bounding_volume.max[0].max(point.x);
            bounding_volume.max[1] = bounding_volume.max[1].max(point.y);
            bounding_volume.max[2] = bounding_volume.max[2].max(point.z);
            bounding_volume.min[0] = bounding_volume.min[0].min(point.x);
            bounding_volume.min[1] = bounding_volume.min[1].min(point.y);
            bounding_volume.min[2] = bounding_volume.min[2].min(point.z);
        }

        let metadata = Metadata {
            point_count: points.len(),
            bounding_volume,
            attributes,
        };

        PointCloud { points, metadata }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.metadata.attributes.colors
    }

    pub fn has_normals(&self) -> bool {
        self.metadata.attributes.normals
    }

    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(Point::position).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64, &Point)> {
        self.points
            .iter()
            .map(|point| (point.x, point.y, point.z, point))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (f64, f64, f64, &mut Point)> {
        self.points
            .iter_mut()
            .map(|point| (point.x, point.y, point.z, point))
    }
}

// Axis-aligned bounds of all point positions. Inverted (MAX/MIN) for an empty cloud.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub point_count: usize,
    pub bounding_volume: BoundingVolume,
    pub attributes: Attributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_volume_covers_all_points() {
        let pc = PointCloud::new(
            vec![Point::new(1.0, -2.0, 3.0), Point::new(-1.0, 4.0, 0.5)],
            Attributes::POSITIONS_ONLY,
        );
        assert_eq!(pc.metadata.point_count, 2);
        assert_eq!(pc.metadata.bounding_volume.min, [-1.0, -2.0, 0.5]);
        assert_eq!(pc.metadata.bounding_volume.max, [1.0, 4.0, 3.0]);
    }

    #[test]
    fn opposite_unit_normals_are_two_apart() {
        let up = Normal::new(0.0, 0.0, 1.0);
        assert_eq!(up.distance(&up.flipped()), 2.0);
        assert_eq!(up.distance(&up), 0.0);
    }

    #[test]
    fn zero_normal_stays_zero_when_normalized() {
        assert_eq!(Normal::default().normalized(), Normal::default());
        let n = Normal::new(3.0, 0.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn color_to_rgb8_rounds_and_clamps() {
        assert_eq!(Color::new(1.0, 0.5, -0.2).to_rgb8(), [255, 128, 0]);
    }
}
