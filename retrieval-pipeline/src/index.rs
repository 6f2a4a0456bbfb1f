use std::cmp::Ordering;

/// Brute-force exact nearest-neighbor structure over document embeddings,
/// using squared Euclidean distance.
///
/// The index is derived data: it is rebuilt wholesale from the document list
/// on every ingestion and never updated in place. The scan is exhaustive, so
/// search is exact, with no tuning parameters and no sampling.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn build(vectors: Vec<Vec<f32>>) -> Self {
        Self { vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Indices of the `top_k` vectors nearest to `query`, nearest first.
    ///
    /// The scan is exhaustive and ties break toward the lower insertion
    /// index, so results are deterministic for a fixed vector set.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<usize> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, vector)| (idx, squared_l2(query, vector)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        scored.into_iter().map(|(idx, _)| idx).collect()
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_returns_nearest_first() {
        let index = FlatIndex::build(vec![
            vec![10.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 3.0],
        ]);

        let hits = index.search(&[0.0, 0.0], 2);
        assert_eq!(hits, vec![1, 2]);
    }

    #[test]
    fn test_search_caps_at_vector_count() {
        let index = FlatIndex::build(vec![vec![1.0], vec![2.0]]);

        let hits = index.search(&[0.0], 10);
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn test_search_on_empty_index_returns_nothing() {
        let index = FlatIndex::default();

        assert!(index.search(&[1.0, 2.0], 2).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_equidistant_ties_break_by_insertion_order() {
        let index = FlatIndex::build(vec![
            vec![1.0, 0.0],
            vec![-1.0, 0.0],
            vec![0.0, 1.0],
        ]);

        // All three are distance 1 from the origin.
        let hits = index.search(&[0.0, 0.0], 3);
        assert_eq!(hits, vec![0, 1, 2]);
    }
}
