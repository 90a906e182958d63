use crate::error::IndexError;
use crate::traits::{Neighbor, VectorIndex};

/// Exact nearest-neighbor search by squared L2 distance over a row-major matrix.
#[derive(Debug, Clone, Default)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn row(&self, position: usize) -> &[f32] {
        let start = position * self.dimension;
        &self.data[start..start + self.dimension]
    }
}

impl VectorIndex for FlatL2Index {
    fn build(&mut self, vectors: &[Vec<f32>]) -> Result<(), IndexError> {
        let Some(first) = vectors.first() else {
            self.dimension = 0;
            self.data.clear();
            return Ok(());
        };

        let dimension = first.len();
        if dimension == 0 {
            return Err(IndexError::ZeroDimension);
        }

        let mut data = Vec::with_capacity(dimension * vectors.len());
        for vector in vectors {
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        self.dimension = dimension;
        self.data = data;
        Ok(())
    }

    fn query(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut neighbors = (0..self.len())
            .map(|position| Neighbor {
                position,
                distance: squared_l2(self.row(position), query),
            })
            .collect::<Vec<_>>();

        neighbors.sort_by(|left, right| {
            left.distance
                .total_cmp(&right.distance)
                .then(left.position.cmp(&right.position))
        });
        neighbors.truncate(k.min(self.len()));

        Ok(neighbors)
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }
}

pub fn squared_l2(left: &[f32], right: &[f32]) -> f32 {
    left.iter()
        .zip(right)
        .map(|(a, b)| {
            let delta = a - b;
            delta * delta
        })
        .sum()
}
