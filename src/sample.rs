use rand::seq::{index, SliceRandom};
use rand::RngCore;
use rand_distr::{Distribution, WeightedIndex};
use crate::errors::NystromError;

/// `count` distinct indices drawn uniformly from `0..n`.
pub fn uniform_seed(n: usize, count: usize, rng: &mut dyn RngCore) -> Vec<usize> {
    index::sample(rng, n, count.min(n)).into_vec()
}

/// Rescales non-negative scores into a probability vector.
pub fn normalized(scores: &[f64]) -> Result<Vec<f64>, NystromError> {
    if scores.iter().any(|w| !w.is_finite()) {
        return Err(NystromError::NonFiniteScores);
    }
    let total: f64 = scores.iter().sum();
    if total <= 0.0 {
        return Err(NystromError::ExhaustedSupport);
    }
    Ok(scores.iter().map(|w| w / total).collect())
}

/**
Draws up to `n` distinct items from `candidates` without replacement.

* Inputs:
`candidates` are the items to draw from, `n` the number wanted, `weights` optional
non-negative weights parallel to `candidates` (they need not sum to one).

* Output:
`min(n, |candidates|)` items drawn uniformly, or with weights `min(n, #nonzero weights)`
items drawn one at a time proportionally to the weights of those still left.

Weights that are all zero, or contain a NaN, infinite or negative value, are an error.
 */
pub fn pick_up_to(
    candidates: &[usize],
    n: usize,
    weights: Option<&[f64]>,
    rng: &mut dyn RngCore,
) -> Result<Vec<usize>, NystromError> {
    let weights = match weights {
        None => {
            return Ok(candidates.choose_multiple(rng, n.min(candidates.len())).copied().collect());
        }
        Some(w) => w,
    };
    if weights.len() != candidates.len() {
        return Err(NystromError::WeightMismatch { weights: weights.len(), candidates: candidates.len() });
    }

    if weights.iter().any(|w| !w.is_finite()) {
        return Err(NystromError::NonFiniteScores);
    }
    let support = weights.iter().filter(|&&w| w > 0.0).count();
    if support == 0 {
        return Err(NystromError::ExhaustedSupport);
    }
    let amount = n.min(support);

    // the table is rebuilt from the remaining weights after every draw: subtracting a
    // dominant weight from the running total can round the rest of the mass to zero
    let mut remaining = weights.to_vec();
    let mut chosen = Vec::with_capacity(amount);
    for _ in 0..amount {
        let dist: WeightedIndex<f64> = WeightedIndex::new(&remaining)?;
        let pos = dist.sample(rng);
        chosen.push(candidates[pos]);
        remaining[pos] = 0.0;
    }
    Ok(chosen)
}
