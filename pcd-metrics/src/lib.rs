//! Local-neighborhood distortion histograms for point clouds.
//!
//! Every point is compared against its k nearest neighbors; the attribute
//! differences observed are quantized into a bitmask label per metric, and the
//! label frequencies over the whole cloud form the feature vector.

pub mod catalog;
pub mod color;
pub mod config;
pub mod engine;
mod error;
pub mod histogram;

pub use catalog::{LabelRule, MetricKind};
pub use config::{MetricSelection, MetricsConfig, NeighborhoodSizes};
pub use engine::MetricEngine;
pub use error::MetricError;
pub use histogram::{format_probability, FeatureVector, Histogram, HistogramSet};
