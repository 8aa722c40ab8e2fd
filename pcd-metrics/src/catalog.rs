//! Fixed definitions of the five neighborhood metrics.
//!
//! Every metric turns one (point, neighbor) pair into at most one set bit; the
//! label of a point is the union of the bits contributed by all neighbors of a
//! neighborhood, so it records which difference magnitudes occurred rather than
//! any single difference.

use std::fmt;

use pcd_core::pointcloud::point::{Normal, Point};

use crate::color::color_difference;

/// Perceptual color difference, 2.5 units per bucket. Bit 7 is open-ended.
pub const COLOR_8BIT_THRESHOLDS: [f64; 8] = [2.5, 5.0, 7.5, 10.0, 12.5, 15.0, 17.5, 20.0];

/// Perceptual color difference, 1.5 units per bucket. Bit 11 is open-ended.
pub const COLOR_12BIT_THRESHOLDS: [f64; 12] = [
    1.5, 3.0, 4.5, 6.0, 7.5, 9.0, 10.5, 12.0, 13.5, 15.0, 16.5, 18.0,
];

pub const GEOMETRY_16BIT_THRESHOLDS: [f64; 16] = [
    0.05, 0.1, 0.175, 0.275, 0.4, 0.525, 0.65, 0.775, 0.9, 1.025, 1.15, 1.275, 1.4, 1.525, 1.65,
    1.8,
];

pub const GEOMETRY_12BIT_THRESHOLDS: [f64; 12] = [
    0.05, 0.1, 0.3, 0.45, 0.6, 0.75, 0.9, 1.05, 1.2, 1.35, 1.55, 1.75,
];

/// Upper bound of the last normal-distance bucket; distances at or above it set no bit.
pub const GEOMETRY_DISTANCE_LIMIT: f64 = 2.0;

/// Half-open intervals `[thresholds[b], thresholds[b + 1])`, bit `b` each.
///
/// Values below the first threshold set nothing. The last interval ends at
/// `limit` when one is given, otherwise it is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketTable {
    pub thresholds: &'static [f64],
    pub limit: Option<f64>,
}

impl BucketTable {
    pub const fn new(thresholds: &'static [f64], limit: Option<f64>) -> Self {
        Self { thresholds, limit }
    }

    pub fn bits(&self) -> u32 {
        self.thresholds.len() as u32
    }

    /// The single bit for the interval holding `value`, or 0.
    pub fn crossing(&self, value: f64) -> u32 {
        let above = self.thresholds.partition_point(|t| *t <= value);
        if above == 0 {
            return 0;
        }
        if above == self.thresholds.len() && self.limit.is_some_and(|limit| value >= limit) {
            return 0;
        }
        1 << (above - 1)
    }
}

/// Octant of a vector: bit `4·sx + 2·sy + sz` where each sign term is 0 for a
/// negative component and 1 otherwise.
pub fn octant(normal: &Normal) -> u32 {
    let sign = |v: f64| if v < 0.0 { 0 } else { 1 };
    4 * sign(normal.x) + 2 * sign(normal.y) + sign(normal.z)
}

/// Which per-pair quantities the enabled metrics need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    pub color_difference: bool,
    pub normal_distance: bool,
}

impl Requirements {
    pub fn union(self, other: Requirements) -> Requirements {
        Requirements {
            color_difference: self.color_difference || other.color_difference,
            normal_distance: self.normal_distance || other.normal_distance,
        }
    }
}

/// Attribute differences between a point and one neighbor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairDelta {
    pub color_difference: f64,
    pub normal_distance: f64,
    pub neighbor_octant: u32,
}

impl PairDelta {
    pub fn measure(center: &Point, neighbor: &Point, requirements: Requirements) -> Self {
        let color_difference = if requirements.color_difference {
            color_difference(&center.color, &neighbor.color)
        } else {
            0.0
        };
        let normal_distance = if requirements.normal_distance {
            center.normal.distance(&neighbor.normal)
        } else {
            0.0
        };
        Self {
            color_difference,
            normal_distance,
            neighbor_octant: octant(&neighbor.normal),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelRule {
    /// Perceptual difference between the point's and the neighbor's colors.
    Color(BucketTable),
    /// Euclidean distance between the point's and the neighbor's unit normals.
    GeometryDistance(BucketTable),
    /// Octant of the neighbor's own normal; the point's attributes do not matter.
    GeometryOctant,
}

impl LabelRule {
    pub fn bits(&self) -> u32 {
        match self {
            LabelRule::Color(table) | LabelRule::GeometryDistance(table) => table.bits(),
            LabelRule::GeometryOctant => 8,
        }
    }

    pub fn requirements(&self) -> Requirements {
        match self {
            LabelRule::Color(_) => Requirements {
                color_difference: true,
                normal_distance: false,
            },
            LabelRule::GeometryDistance(_) => Requirements {
                color_difference: false,
                normal_distance: true,
            },
            LabelRule::GeometryOctant => Requirements::default(),
        }
    }

    /// Bit contributed by one neighbor.
    pub fn neighbor_bits(&self, delta: &PairDelta) -> u32 {
        match self {
            LabelRule::Color(table) => table.crossing(delta.color_difference),
            LabelRule::GeometryDistance(table) => table.crossing(delta.normal_distance),
            LabelRule::GeometryOctant => 1 << delta.neighbor_octant,
        }
    }

    /// Label of `center` over an ordered neighbor list (the point itself excluded).
    pub fn label<'a>(&self, center: &Point, neighbors: impl IntoIterator<Item = &'a Point>) -> u32 {
        let requirements = self.requirements();
        neighbors.into_iter().fold(0, |label, neighbor| {
            label | self.neighbor_bits(&PairDelta::measure(center, neighbor, requirements))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Color12Bit,
    Color8Bit,
    Geometry16Bit,
    Geometry12Bit,
    Geometry8Bit,
}

impl MetricKind {
    /// Catalog order; also the order of the metric-enable flags and the index
    /// written to the output.
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Color12Bit,
        MetricKind::Color8Bit,
        MetricKind::Geometry16Bit,
        MetricKind::Geometry12Bit,
        MetricKind::Geometry8Bit,
    ];

    pub fn index(&self) -> usize {
        match self {
            MetricKind::Color12Bit => 0,
            MetricKind::Color8Bit => 1,
            MetricKind::Geometry16Bit => 2,
            MetricKind::Geometry12Bit => 3,
            MetricKind::Geometry8Bit => 4,
        }
    }

    pub fn rule(&self) -> LabelRule {
        match self {
            MetricKind::Color12Bit => {
                LabelRule::Color(BucketTable::new(&COLOR_12BIT_THRESHOLDS, None))
            }
            MetricKind::Color8Bit => LabelRule::Color(BucketTable::new(&COLOR_8BIT_THRESHOLDS, None)),
            MetricKind::Geometry16Bit => LabelRule::GeometryDistance(BucketTable::new(
                &GEOMETRY_16BIT_THRESHOLDS,
                Some(GEOMETRY_DISTANCE_LIMIT),
            )),
            MetricKind::Geometry12Bit => LabelRule::GeometryDistance(BucketTable::new(
                &GEOMETRY_12BIT_THRESHOLDS,
                Some(GEOMETRY_DISTANCE_LIMIT),
            )),
            MetricKind::Geometry8Bit => LabelRule::GeometryOctant,
        }
    }

    pub fn bits(&self) -> u32 {
        self.rule().bits()
    }

    /// Number of distinct labels, `2^bits`.
    pub fn bucket_count(&self) -> usize {
        1 << self.bits()
    }

    pub fn uses_color(&self) -> bool {
        matches!(self.rule(), LabelRule::Color(_))
    }

    pub fn uses_normals(&self) -> bool {
        !self.uses_color()
    }

    pub fn description(&self) -> &'static str {
        match self {
            MetricKind::Color12Bit => "color CIEDE2000 12-bit",
            MetricKind::Color8Bit => "color CIEDE2000 8-bit",
            MetricKind::Geometry16Bit => "normal distance 16-bit",
            MetricKind::Geometry12Bit => "normal distance 12-bit",
            MetricKind::Geometry8Bit => "normal octant 8-bit",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "metric_{} ({})", self.index(), self.description())
    }
}
