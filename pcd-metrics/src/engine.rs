use rayon::prelude::*;

use pcd_core::pointcloud::{index::SpatialIndex, point::PointCloud};

use crate::{
    catalog::{LabelRule, MetricKind, PairDelta, Requirements},
    config::MetricsConfig,
    histogram::HistogramSet,
    MetricError,
};

// Points handed to a worker at a time; bounds how many private histogram sets
// rayon's fold creates.
const MIN_POINTS_PER_TASK: usize = 1024;

/// Computes the per-point labels of every enabled metric and accumulates them
/// into histograms.
pub struct MetricEngine {
    config: MetricsConfig,
    metrics: Vec<(MetricKind, LabelRule)>,
    requirements: Requirements,
    // (neighborhood slot, size), sorted by size
    slots_by_size: Vec<(usize, usize)>,
}

impl MetricEngine {
    pub fn new(config: MetricsConfig) -> Self {
        let metrics: Vec<(MetricKind, LabelRule)> = config
            .metrics
            .enabled()
            .into_iter()
            .map(|metric| (metric, metric.rule()))
            .collect();
        let requirements = metrics
            .iter()
            .fold(Requirements::default(), |acc, (_, rule)| {
                acc.union(rule.requirements())
            });

        let mut slots_by_size: Vec<(usize, usize)> = config
            .neighborhoods
            .sizes()
            .iter()
            .copied()
            .enumerate()
            .collect();
        slots_by_size.sort_by_key(|(_, size)| *size);

        Self {
            config,
            metrics,
            requirements,
            slots_by_size,
        }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn enabled_metrics(&self) -> Vec<MetricKind> {
        self.metrics.iter().map(|(metric, _)| *metric).collect()
    }

    pub fn empty_histograms(&self) -> HistogramSet {
        HistogramSet::new(&self.enabled_metrics(), self.config.neighborhoods.sizes())
    }

    /// Checks that the cloud can feed every enabled metric.
    pub fn validate(&self, point_cloud: &PointCloud) -> Result<(), MetricError> {
        if point_cloud.is_empty() {
            return Err(MetricError::EmptyPointCloud);
        }
        for (metric, _) in &self.metrics {
            if metric.uses_color() && !point_cloud.has_colors() {
                return Err(MetricError::MissingAttribute {
                    metric: *metric,
                    attribute: "colors",
                });
            }
            if metric.uses_normals() && !point_cloud.has_normals() {
                return Err(MetricError::MissingAttribute {
                    metric: *metric,
                    attribute: "normals",
                });
            }
        }
        Ok(())
    }

    /// Runs the parallel pass over all points of `point_cloud`.
    ///
    /// Each rayon task fills a private [`HistogramSet`]; the sets are summed
    /// once the pass completes, so counts are exact for any thread count.
    pub fn run<I: SpatialIndex>(
        &self,
        point_cloud: &PointCloud,
        index: &I,
    ) -> Result<HistogramSet, MetricError> {
        if !self.metrics.is_empty() {
            self.validate(point_cloud)?;
        }
        if index.len() != point_cloud.len() {
            return Err(MetricError::IndexMismatch {
                index: index.len(),
                cloud: point_cloud.len(),
            });
        }

        let available = point_cloud.len().saturating_sub(1);
        if self.config.neighborhoods.max() > available {
            log::warn!(
                "neighborhood size {} exceeds the {} other points; using all of them",
                self.config.neighborhoods.max(),
                available
            );
        }

        if self.metrics.is_empty() {
            return Ok(self.empty_histograms());
        }

        let label_count = self.metrics.len() * self.slots_by_size.len();
        let histograms = (0..point_cloud.len())
            .into_par_iter()
            .with_min_len(MIN_POINTS_PER_TASK)
            .fold(
                || (self.empty_histograms(), vec![0u32; label_count]),
                |(mut set, mut labels), i| {
                    self.point_labels(point_cloud, index, i, &mut labels);
                    set.record(&labels);
                    (set, labels)
                },
            )
            .map(|(set, _)| set)
            .reduce(
                || self.empty_histograms(),
                |mut a, b| {
                    a.merge(&b);
                    a
                },
            );

        Ok(histograms)
    }

    /// Labels of point `i` for every neighborhood slot and enabled metric,
    /// written neighborhood-major into `labels`.
    ///
    /// Neighbors are scanned once in nearest-first order; the running union after
    /// the k-th neighbor is the label for neighborhood size k.
    pub fn point_labels<I: SpatialIndex>(
        &self,
        point_cloud: &PointCloud,
        index: &I,
        i: usize,
        labels: &mut [u32],
    ) {
        let metric_count = self.metrics.len();
        let points = &point_cloud.points;
        let center = &points[i];
        let neighbors = index.search_knn_of(i, self.config.neighborhoods.query_size());

        let mut running = vec![0u32; metric_count];
        let mut pending = self.slots_by_size.iter().peekable();

        for (rank, neighbor) in neighbors.iter().enumerate().skip(1) {
            let delta = PairDelta::measure(center, &points[neighbor.index], self.requirements);
            for (label, (_, rule)) in running.iter_mut().zip(&self.metrics) {
                *label |= rule.neighbor_bits(&delta);
            }

            while let Some(&&(slot, size)) = pending.peek() {
                if size > rank {
                    break;
                }
                labels[slot * metric_count..(slot + 1) * metric_count].copy_from_slice(&running);
                pending.next();
            }
        }

        // sizes beyond the neighbors actually found
        for &(slot, _) in pending {
            labels[slot * metric_count..(slot + 1) * metric_count].copy_from_slice(&running);
        }
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::{
        index::KdTreeIndex,
        point::{Attributes, Color, Normal, Point},
    };

    use super::*;
    use crate::config::{MetricSelection, NeighborhoodSizes};

    fn config(sizes: &[usize], metrics: MetricSelection) -> MetricsConfig {
        MetricsConfig::new(NeighborhoodSizes::new(sizes.to_vec()).unwrap(), metrics)
    }

    fn row(n: usize) -> PointCloud {
        let points = (0..n)
            .map(|i| {
                let shade = (i % 2) as f64;
                Point::new(i as f64, 0.0, 0.0)
                    .with_color(Color::new(shade, shade, shade))
                    .with_normal(Normal::new(0.0, 0.0, if i % 3 == 0 { 1.0 } else { -1.0 }))
            })
            .collect();
        PointCloud::new(points, Attributes::ALL)
    }

    #[test]
    fn coincident_black_and_white_points() {
        let pc = PointCloud::new(
            vec![
                Point::new(0.0, 0.0, 0.0)
                    .with_color(Color::new(0.0, 0.0, 0.0))
                    .with_normal(Normal::new(0.0, 0.0, 1.0)),
                Point::new(0.0, 0.0, 0.0)
                    .with_color(Color::new(1.0, 1.0, 1.0))
                    .with_normal(Normal::new(0.0, 0.0, 1.0)),
            ],
            Attributes::ALL,
        );
        let index = KdTreeIndex::from_point_cloud(&pc);
        let engine = MetricEngine::new(config(&[1], MetricSelection::only(&[MetricKind::Color8Bit])));

        let set = engine.run(&pc, &index).unwrap();
        let histogram = set.get(MetricKind::Color8Bit, 0).unwrap();
        assert_eq!(histogram.total(), 2);
        assert_eq!(histogram.counts[1 << 7], 2);

        let vectors = set.normalize();
        assert_eq!(vectors[0].probabilities[1 << 7], 1.0);
    }

    #[test]
    fn labels_for_each_neighborhood_are_prefix_unions() {
        // neighbors of point 0 along the row: 1 (white), 2 (black), 3 (white)
        let pc = row(6);
        let index = KdTreeIndex::from_point_cloud(&pc);
        let engine = MetricEngine::new(config(
            &[3, 1],
            MetricSelection::only(&[MetricKind::Color8Bit, MetricKind::Geometry8Bit]),
        ));

        let mut labels = vec![0u32; 4];
        engine.point_labels(&pc, &index, 0, &mut labels);

        // slot 0 (k=3): colors white, black, white -> bit 7; octants of -z, -z, +z -> 6 and 7
        assert_eq!(labels[0], 1 << 7);
        assert_eq!(labels[1], (1 << 6) | (1 << 7));
        // slot 1 (k=1): single white neighbor with -z normal
        assert_eq!(labels[2], 1 << 7);
        assert_eq!(labels[3], 1 << 6);
    }

    #[test]
    fn oversized_neighborhood_uses_every_other_point() {
        let pc = row(3);
        let index = KdTreeIndex::from_point_cloud(&pc);
        let engine = MetricEngine::new(config(&[10], MetricSelection::all()));
        let set = engine.run(&pc, &index).unwrap();
        assert!(set.histograms().iter().all(|h| h.total() == 3));
    }

    #[test]
    fn counts_are_exact_and_repeatable() {
        let pc = row(5000);
        let index = KdTreeIndex::from_point_cloud(&pc);
        let engine = MetricEngine::new(config(&[8, 2, 4], MetricSelection::all()));

        let first = engine.run(&pc, &index).unwrap();
        let second = engine.run(&pc, &index).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.point_count(), 5000);
        for histogram in first.histograms() {
            assert_eq!(histogram.total(), 5000);
        }
        for vector in first.normalize() {
            assert!((vector.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn no_enabled_metrics_yields_no_histograms() {
        let pc = row(4);
        let index = KdTreeIndex::from_point_cloud(&pc);
        let engine = MetricEngine::new(config(&[2], MetricSelection::none()));
        let set = engine.run(&pc, &index).unwrap();
        assert!(set.histograms().is_empty());
        assert!(set.normalize().is_empty());
    }

    #[test]
    fn rejects_clouds_lacking_required_attributes() {
        let pc = PointCloud::new(
            vec![Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0)],
            Attributes {
                colors: true,
                normals: false,
            },
        );
        let index = KdTreeIndex::from_point_cloud(&pc);
        let engine = MetricEngine::new(config(&[1], MetricSelection::all()));
        assert!(matches!(
            engine.run(&pc, &index),
            Err(MetricError::MissingAttribute {
                attribute: "normals",
                ..
            })
        ));

        let color_only = MetricEngine::new(config(
            &[1],
            MetricSelection::only(&[MetricKind::Color12Bit]),
        ));
        assert!(color_only.run(&pc, &index).is_ok());
    }

    #[test]
    fn rejects_empty_clouds() {
        let pc = PointCloud::new(Vec::new(), Attributes::ALL);
        let index = KdTreeIndex::from_point_cloud(&pc);
        let engine = MetricEngine::new(config(&[1], MetricSelection::all()));
        assert!(matches!(
            engine.run(&pc, &index),
            Err(MetricError::EmptyPointCloud)
        ));
    }
}
