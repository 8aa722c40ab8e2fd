use std::str::FromStr;

use crate::{catalog::MetricKind, MetricError};

pub const MAX_NEIGHBORHOODS: usize = 16;

/// Neighborhood sizes to analyse, in the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodSizes {
    sizes: Vec<usize>,
}

impl NeighborhoodSizes {
    pub fn new(sizes: Vec<usize>) -> Result<Self, MetricError> {
        if sizes.is_empty() {
            return Err(MetricError::NoNeighborhood);
        }
        if sizes.len() > MAX_NEIGHBORHOODS {
            return Err(MetricError::TooManyNeighborhoods {
                max: MAX_NEIGHBORHOODS,
                got: sizes.len(),
            });
        }
        if sizes.contains(&0) {
            return Err(MetricError::InvalidNeighborhood("0".to_string()));
        }
        Ok(Self { sizes })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn max(&self) -> usize {
        self.sizes.iter().copied().max().unwrap_or(0)
    }

    /// Neighbors fetched per point: the largest size plus the point itself.
    pub fn query_size(&self) -> usize {
        self.max() + 1
    }
}

impl FromStr for NeighborhoodSizes {
    type Err = MetricError;

    /// Parses a comma separated list such as `"12,10,8"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(MetricError::NoNeighborhood);
        }
        let sizes = s
            .split(',')
            .map(|token| {
                let token = token.trim();
                match token.parse::<usize>() {
                    Ok(size) if size > 0 => Ok(size),
                    _ => Err(MetricError::InvalidNeighborhood(token.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(sizes)
    }
}

/// Enable flag per catalog metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSelection {
    enabled: [bool; 5],
}

impl MetricSelection {
    pub fn new(enabled: [bool; 5]) -> Self {
        Self { enabled }
    }

    pub fn all() -> Self {
        Self { enabled: [true; 5] }
    }

    pub fn none() -> Self {
        Self {
            enabled: [false; 5],
        }
    }

    pub fn only(metrics: &[MetricKind]) -> Self {
        let mut enabled = [false; 5];
        for metric in metrics {
            enabled[metric.index()] = true;
        }
        Self { enabled }
    }

    pub fn is_enabled(&self, metric: MetricKind) -> bool {
        self.enabled[metric.index()]
    }

    /// Enabled metrics in catalog order.
    pub fn enabled(&self) -> Vec<MetricKind> {
        MetricKind::ALL
            .into_iter()
            .filter(|m| self.is_enabled(*m))
            .collect()
    }

    pub fn any(&self) -> bool {
        self.enabled.iter().any(|e| *e)
    }
}

impl Default for MetricSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for MetricSelection {
    type Err = MetricError;

    /// Parses exactly five comma separated `0`/`1` flags in catalog order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split(',').map(str::trim).collect();
        if tokens.len() != MetricKind::ALL.len() {
            return Err(MetricError::MetricArity {
                expected: MetricKind::ALL.len(),
                got: tokens.len(),
            });
        }

        let mut enabled = [false; 5];
        for (flag, token) in enabled.iter_mut().zip(tokens) {
            *flag = match token {
                "0" => false,
                "1" => true,
                other => return Err(MetricError::InvalidMetricFlag(other.to_string())),
            };
        }
        Ok(Self { enabled })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    pub neighborhoods: NeighborhoodSizes,
    pub metrics: MetricSelection,
}

impl MetricsConfig {
    pub fn new(neighborhoods: NeighborhoodSizes, metrics: MetricSelection) -> Self {
        Self {
            neighborhoods,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_neighborhood_lists() {
        let sizes: NeighborhoodSizes = "12, 11,10,9,8".parse().unwrap();
        assert_eq!(sizes.sizes(), &[12, 11, 10, 9, 8]);
        assert_eq!(sizes.max(), 12);
        assert_eq!(sizes.query_size(), 13);
    }

    #[test]
    fn rejects_bad_neighborhood_lists() {
        assert!(matches!(
            "".parse::<NeighborhoodSizes>(),
            Err(MetricError::NoNeighborhood)
        ));
        assert!(matches!(
            "4,x".parse::<NeighborhoodSizes>(),
            Err(MetricError::InvalidNeighborhood(t)) if t == "x"
        ));
        assert!("0".parse::<NeighborhoodSizes>().is_err());
        assert!("-3".parse::<NeighborhoodSizes>().is_err());
        assert!("4,,5".parse::<NeighborhoodSizes>().is_err());

        let seventeen = vec!["1"; 17].join(",");
        assert!(matches!(
            seventeen.parse::<NeighborhoodSizes>(),
            Err(MetricError::TooManyNeighborhoods { max: 16, got: 17 })
        ));
    }

    #[test]
    fn parses_metric_flags_in_catalog_order() {
        let selection: MetricSelection = "1,0,1,0,1".parse().unwrap();
        assert_eq!(
            selection.enabled(),
            vec![
                MetricKind::Color12Bit,
                MetricKind::Geometry16Bit,
                MetricKind::Geometry8Bit
            ]
        );
        assert!(!"0,0,0,0,0".parse::<MetricSelection>().unwrap().any());
    }

    #[test]
    fn metric_flags_have_fixed_arity() {
        assert!(matches!(
            "1,1,1".parse::<MetricSelection>(),
            Err(MetricError::MetricArity { expected: 5, got: 3 })
        ));
        assert!(matches!(
            "1,1,1,1,2".parse::<MetricSelection>(),
            Err(MetricError::InvalidMetricFlag(t)) if t == "2"
        ));
    }

    #[test]
    fn default_selection_enables_everything() {
        assert_eq!(MetricSelection::default().enabled().len(), 5);
    }
}
