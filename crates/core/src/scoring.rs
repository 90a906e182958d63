use crate::traits::Neighbor;

/// Results scoring at or below this value are dropped.
pub const SCORE_THRESHOLD: f64 = 0.5;

pub const DEFAULT_TOP_K: usize = 5;

pub fn similarity_from_distance(distance: f32) -> f64 {
    if !distance.is_finite() {
        return 0.0;
    }

    let raw = 1.0 / (1.0 + f64::from(distance.max(0.0)));
    (raw * 1_000.0).round() / 1_000.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredNeighbor {
    pub position: usize,
    pub distance: f32,
    pub score: f64,
}

pub fn rank_and_filter(mut neighbors: Vec<Neighbor>) -> Vec<ScoredNeighbor> {
    neighbors.retain(|neighbor| neighbor.distance.is_finite());
    neighbors.sort_by(|left, right| left.distance.total_cmp(&right.distance));

    neighbors
        .into_iter()
        .map(|neighbor| ScoredNeighbor {
            position: neighbor.position,
            distance: neighbor.distance,
            score: similarity_from_distance(neighbor.distance),
        })
        .filter(|scored| scored.score > SCORE_THRESHOLD)
        .collect()
}
