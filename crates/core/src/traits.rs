use crate::error::IndexError;

/// A stored vector's position and its squared L2 distance from the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

pub trait VectorIndex {
    fn build(&mut self, vectors: &[Vec<f32>]) -> Result<(), IndexError>;

    fn query(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
