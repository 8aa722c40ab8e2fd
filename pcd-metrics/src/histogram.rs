use crate::catalog::MetricKind;

/// Label frequencies of one (metric, neighborhood size) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    pub metric: MetricKind,
    pub neighborhood: usize,
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn new(metric: MetricKind, neighborhood: usize) -> Self {
        Self {
            metric,
            neighborhood,
            counts: vec![0; metric.bucket_count()],
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// All histograms of one run, metric-major: for every enabled metric in catalog
/// order, one histogram per configured neighborhood size in the order given.
///
/// Counters are plain integers owned by whoever holds the set; parallel workers
/// each fill their own set and the sets are summed afterwards with [`merge`].
///
/// [`merge`]: HistogramSet::merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramSet {
    histograms: Vec<Histogram>,
    metrics: Vec<MetricKind>,
    neighborhoods: Vec<usize>,
    point_count: u64,
}

impl HistogramSet {
    pub fn new(metrics: &[MetricKind], neighborhoods: &[usize]) -> Self {
        let histograms = metrics
            .iter()
            .flat_map(|metric| {
                neighborhoods
                    .iter()
                    .map(move |size| Histogram::new(*metric, *size))
            })
            .collect();
        Self {
            histograms,
            metrics: metrics.to_vec(),
            neighborhoods: neighborhoods.to_vec(),
            point_count: 0,
        }
    }

    pub fn histograms(&self) -> &[Histogram] {
        &self.histograms
    }

    pub fn point_count(&self) -> u64 {
        self.point_count
    }

    pub fn get(&self, metric: MetricKind, neighborhood_slot: usize) -> Option<&Histogram> {
        let metric_pos = self.metrics.iter().position(|m| *m == metric)?;
        if neighborhood_slot >= self.neighborhoods.len() {
            return None;
        }
        self.histograms
            .get(metric_pos * self.neighborhoods.len() + neighborhood_slot)
    }

    /// Counts one point. `labels` is neighborhood-major: the label of metric
    /// `m` for neighborhood slot `s` sits at `s * metrics + m`.
    pub fn record(&mut self, labels: &[u32]) {
        let metric_count = self.metrics.len();
        let slots = self.neighborhoods.len();
        debug_assert_eq!(labels.len(), metric_count * slots);

        for slot in 0..slots {
            for metric_pos in 0..metric_count {
                let label = labels[slot * metric_count + metric_pos] as usize;
                self.histograms[metric_pos * slots + slot].counts[label] += 1;
            }
        }
        self.point_count += 1;
    }

    /// Element-wise sum of two sets built with the same layout.
    pub fn merge(&mut self, other: &HistogramSet) {
        debug_assert_eq!(self.metrics, other.metrics);
        debug_assert_eq!(self.neighborhoods, other.neighborhoods);

        for (mine, theirs) in self.histograms.iter_mut().zip(&other.histograms) {
            for (a, b) in mine.counts.iter_mut().zip(&theirs.counts) {
                *a += b;
            }
        }
        self.point_count += other.point_count;
    }

    /// Divides every bucket by the number of points counted.
    pub fn normalize(&self) -> Vec<FeatureVector> {
        let total = self.point_count as f64;
        self.histograms
            .iter()
            .map(|histogram| FeatureVector {
                metric: histogram.metric,
                neighborhood: histogram.neighborhood,
                probabilities: histogram
                    .counts
                    .iter()
                    .map(|count| {
                        if total > 0.0 {
                            *count as f64 / total
                        } else {
                            0.0
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Empirical probability mass function over the labels of one metric and
/// neighborhood size.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub metric: MetricKind,
    pub neighborhood: usize,
    pub probabilities: Vec<f64>,
}

impl FeatureVector {
    pub fn sum(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    pub fn formatted(&self) -> impl Iterator<Item = String> + '_ {
        self.probabilities.iter().map(|p| format_probability(*p))
    }
}

/// Exact zero is written as `0.0`; anything else with 16 decimals.
pub fn format_probability(value: f64) -> String {
    if value == 0.0 {
        "0.0".to_string()
    } else {
        format!("{:.16}", value)
    }
}
