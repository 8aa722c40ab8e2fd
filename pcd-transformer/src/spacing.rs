//! Average point spacing, used to derive search radii and voxel sizes.

use rayon::prelude::*;

use pcd_core::pointcloud::index::SpatialIndex;

/// Mean over all points of the mean Euclidean distance to their `k` nearest
/// other points. Points with fewer than `k` others average over what exists;
/// an isolated point contributes zero.
pub fn mean_neighbor_distance<I: SpatialIndex>(index: &I, k: usize) -> f64 {
    if index.is_empty() || k == 0 {
        return 0.0;
    }

    let total: f64 = (0..index.len())
        .into_par_iter()
        .map(|i| {
            let neighbors = index.search_knn_of(i, k + 1);
            let others = &neighbors[1..];
            if others.is_empty() {
                return 0.0;
            }
            others
                .iter()
                .map(|n| n.squared_distance.sqrt())
                .sum::<f64>()
                / others.len() as f64
        })
        .sum();

    total / index.len() as f64
}

/// Mean distance from every point to its single nearest other point.
pub fn mean_nearest_distance<I: SpatialIndex>(index: &I) -> f64 {
    mean_neighbor_distance(index, 1)
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::index::KdTreeIndex;

    use super::*;

    #[test]
    fn regular_line_spacing() {
        let index = KdTreeIndex::new((0..10).map(|i| [i as f64 * 0.5, 0.0, 0.0]).collect());
        assert!((mean_nearest_distance(&index) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn averages_over_available_neighbors() {
        // each point of a pair sees only the other one
        let index = KdTreeIndex::new(vec![[0.0, 0.0, 0.0], [0.0, 3.0, 4.0]]);
        assert!((mean_neighbor_distance(&index, 8) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn lone_point_has_no_spacing() {
        let index = KdTreeIndex::new(vec![[1.0, 1.0, 1.0]]);
        assert_eq!(mean_nearest_distance(&index), 0.0);
        assert_eq!(mean_nearest_distance(&KdTreeIndex::new(Vec::new())), 0.0);
    }
}
