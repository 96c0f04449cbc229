use nalgebra::{DMatrix, DVector};
use rand::RngCore;
use crate::errors::NystromError;
use crate::linalg::block;
use crate::mask::PickedMask;
use crate::sample::{normalized, pick_up_to};
use crate::select::{EvalCost, Selection, Selector};

/// Greedy maximization of `det(K[S, S])`, one landmark per step.
pub struct DeterminantGreedy<'a> {
    kernel: &'a DMatrix<f64>,
    sample: bool,
}

impl<'a> DeterminantGreedy<'a> {
    /// `sample = false` takes the argmax gain, `sample = true` draws proportionally to the gains.
    pub fn new(kernel: &'a DMatrix<f64>, sample: bool) -> Self {
        DeterminantGreedy { kernel, sample }
    }
}

/**
Conditional variance of every unpicked item given the picked ones.

* Output:
Entry `j` is `K[i, i] - ||L^{-1} K[picked, i]||^2` for the `j`-th unpicked index `i`,
with `L` the lower Cholesky factor of the picked block. Adding `i` multiplies the
landmark determinant by exactly this amount.

Fails if the picked block is not numerically positive definite.
 */
pub fn determinant_gains(k: &DMatrix<f64>, picked: &PickedMask) -> Result<DVector<f64>, NystromError> {
    let p_idx = picked.picked();
    let u_idx = picked.unpicked();

    let a = block(k, &p_idx, &p_idx);
    let b = block(k, &p_idx, &u_idx);
    let chol = a.cholesky().ok_or(NystromError::Decomposition("Cholesky"))?;
    let tmps = chol
        .l()
        .solve_lower_triangular(&b)
        .ok_or(NystromError::Decomposition("Triangular solve"))?;

    Ok(DVector::from_fn(u_idx.len(), |j, _| k[(u_idx[j], u_idx[j])] - tmps.column(j).norm_squared()))
}

impl<'a> Selector for DeterminantGreedy<'a> {
    fn pick(&mut self, picked: &PickedMask, rng: &mut dyn RngCore) -> Result<Selection, NystromError> {
        let u_idx = picked.unpicked();
        let gains = determinant_gains(self.kernel, picked)?;

        let chosen = if self.sample {
            let gains: Vec<f64> = gains.iter().map(|g| g.max(0.0)).collect();
            let probs = normalized(&gains)?;
            pick_up_to(&u_idx, 1, Some(&probs), rng)?
        } else {
            if gains.iter().any(|g| g.is_nan()) {
                return Err(NystromError::NonFiniteScores);
            }
            if gains.is_empty() {
                return Err(NystromError::ExhaustedSupport);
            }
            vec![u_idx[gains.imax()]]
        };
        Ok(Selection::new(chosen, EvalCost::Default))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, DMatrix};
    use super::{determinant_gains, DeterminantGreedy};
    use crate::errors::NystromError;
    use crate::linalg::block;
    use crate::mask::PickedMask;
    use crate::select::{EvalCost, Selector};
    use crate::test_assist::{generate_rbf_kernel, seeded_rng};

    #[test]
    fn test_gain_is_determinant_ratio() {
        let mut rng = seeded_rng(12);
        let k = generate_rbf_kernel(10, 3, 1.0, &mut rng);
        let mask = PickedMask::from_indices(10, &[1, 4, 8]);
        let gains = determinant_gains(&k, &mask).unwrap();
        let base = block(&k, &[1, 4, 8], &[1, 4, 8]).determinant();
        for (j, &i) in mask.unpicked().iter().enumerate() {
            let mut with = vec![1, 4, 8, i];
            with.sort();
            let grown = block(&k, &with, &with).determinant();
            assert_relative_eq!(gains[j], grown / base, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_deterministic_takes_argmax() {
        let k = dmatrix![
            1.0, 0.9, 0.0, 0.5;
            0.9, 1.0, 0.0, 0.5;
            0.0, 0.0, 1.0, 0.0;
            0.5, 0.5, 0.0, 1.0
        ];
        let mut sel = DeterminantGreedy::new(&k, false);
        let mut rng = seeded_rng(0);
        let out = sel.pick(&PickedMask::from_indices(4, &[0]), &mut rng).unwrap();
        // item 2 is uncorrelated with item 0
        assert_eq!(out.indices, vec![2]);
        assert_eq!(out.cost, EvalCost::Default);
    }

    #[test]
    fn test_sampled_never_picks_zero_gain() {
        // item 1 duplicates item 0, so its gain is zero
        let k = dmatrix![
            2.0, 2.0, 0.0;
            2.0, 2.0, 0.0;
            0.0, 0.0, 1.0
        ];
        let mut sel = DeterminantGreedy::new(&k, true);
        let mut rng = seeded_rng(6);
        for _ in 0..20 {
            let out = sel.pick(&PickedMask::from_indices(3, &[0]), &mut rng).unwrap();
            assert_eq!(out.indices, vec![2]);
        }
    }

    #[test]
    fn test_singular_landmarks_fail() {
        let k = DMatrix::from_element(3, 3, 1.0);
        let mut sel = DeterminantGreedy::new(&k, false);
        let mut rng = seeded_rng(0);
        let err = sel.pick(&PickedMask::from_indices(3, &[0, 1]), &mut rng).unwrap_err();
        assert!(matches!(err, NystromError::Decomposition(_)));
    }
}
