use std::num::NonZeroUsize;

use kiddo::{ImmutableKdTree, SquaredEuclidean};

use crate::pointcloud::point::PointCloud;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub squared_distance: f64,
}

/// k-nearest-neighbor queries over the positions of a point cloud.
pub trait SpatialIndex: Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self, index: usize) -> [f64; 3];

    /// Up to `k` stored points closest to `query`, nearest first.
    fn search_knn(&self, query: &[f64; 3], k: usize) -> Vec<Neighbor>;

    /// Up to `k` neighbors of the stored point `index`, with the point itself
    /// always at position 0.
    ///
    /// Coincident points tie at distance zero and may be returned in any order,
    /// so the query point is moved to the front explicitly.
    fn search_knn_of(&self, index: usize, k: usize) -> Vec<Neighbor> {
        if k == 0 {
            return Vec::new();
        }

        let mut neighbors = self.search_knn(&self.position(index), k);
        match neighbors.iter().position(|n| n.index == index) {
            Some(0) => {}
            Some(at) => {
                let own = neighbors.remove(at);
                neighbors.insert(0, own);
            }
            None => {
                neighbors.insert(
                    0,
                    Neighbor {
                        index,
                        squared_distance: 0.0,
                    },
                );
                neighbors.truncate(k);
            }
        }
        neighbors
    }
}

pub struct KdTreeIndex {
    tree: Option<ImmutableKdTree<f64, 3>>,
    positions: Vec<[f64; 3]>,
}

impl KdTreeIndex {
    pub fn new(positions: Vec<[f64; 3]>) -> Self {
        let tree = if positions.is_empty() {
            None
        } else {
            Some(ImmutableKdTree::new_from_slice(&positions))
        };
        Self { tree, positions }
    }

    pub fn from_point_cloud(point_cloud: &PointCloud) -> Self {
        Self::new(point_cloud.positions())
    }
}

impl SpatialIndex for KdTreeIndex {
    fn len(&self) -> usize {
        self.positions.len()
    }

    fn position(&self, index: usize) -> [f64; 3] {
        self.positions[index]
    }

    fn search_knn(&self, query: &[f64; 3], k: usize) -> Vec<Neighbor> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        let Some(qty) = NonZeroUsize::new(k.min(self.positions.len())) else {
            return Vec::new();
        };

        tree.nearest_n::<SquaredEuclidean>(query, qty)
            .into_iter()
            .map(|n| Neighbor {
                index: n.item as usize,
                squared_distance: n.distance,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> KdTreeIndex {
        KdTreeIndex::new((0..n).map(|i| [i as f64, 0.0, 0.0]).collect())
    }

    #[test]
    fn knn_is_ordered_nearest_first() {
        let index = line(10);
        let found = index.search_knn(&[4.1, 0.0, 0.0], 3);
        let ids: Vec<usize> = found.iter().map(|n| n.index).collect();
        assert_eq!(ids, vec![4, 5, 3]);
        assert!(found[0].squared_distance <= found[1].squared_distance);
    }

    #[test]
    fn query_point_comes_first_even_when_duplicated() {
        let index = KdTreeIndex::new(vec![[0.0; 3], [0.0; 3], [0.0; 3], [1.0, 0.0, 0.0]]);
        for i in 0..3 {
            let found = index.search_knn_of(i, 3);
            assert_eq!(found.len(), 3);
            assert_eq!(found[0].index, i);
        }
    }

    #[test]
    fn k_larger_than_cloud_returns_every_point() {
        let index = line(3);
        assert_eq!(index.search_knn_of(1, 10).len(), 3);
    }

    #[test]
    fn empty_index_answers_nothing() {
        let index = KdTreeIndex::new(Vec::new());
        assert!(index.is_empty());
        assert!(index.search_knn(&[0.0; 3], 4).is_empty());
    }
}
