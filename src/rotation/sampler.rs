use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::DanceId;

/// One candidate with its computed score, alive for a single draw
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub id: DanceId,
    pub score: f64,
}

/// Weighted random sampling over scored candidates.
///
/// A single uniform draw over the cumulative score range picks one
/// candidate with probability proportional to its score. Seeded
/// construction makes the draw sequence reproducible for tests.
#[derive(Debug)]
pub struct WeightedSampler {
    rng: StdRng,
}

impl WeightedSampler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw one candidate with probability proportional to score.
    ///
    /// When every score is numerically zero (all candidates fully
    /// suppressed), falls back to a uniform choice so that an eligible
    /// candidate is still produced.
    pub fn draw(&mut self, candidates: &[ScoredCandidate]) -> Option<DanceId> {
        if candidates.is_empty() {
            return None;
        }

        let total: f64 = candidates.iter().map(|c| c.score).sum();
        if total <= 0.0 || !total.is_finite() {
            let index = self.rng.gen_range(0..candidates.len());
            return Some(candidates[index].id.clone());
        }

        let mut remaining = self.rng.gen_range(0.0..total);
        for candidate in candidates {
            remaining -= candidate.score;
            if remaining < 0.0 {
                return Some(candidate.id.clone());
            }
        }

        // Cumulative rounding can leave the draw just past the final entry
        candidates.last().map(|c| c.id.clone())
    }
}

impl Default for WeightedSampler {
    fn default() -> Self {
        Self::new()
    }
}
