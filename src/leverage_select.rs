use nalgebra::DMatrix;
use rand::RngCore;
use crate::errors::NystromError;
use crate::leverage::leverages_of_unknown;
use crate::linalg::{block, leading_row_sq_norms};
use crate::mask::PickedMask;
use crate::sample::{normalized, pick_up_to};
use crate::select::{EvalCost, Selection, Selector};

/// Samples by the rank-`p` leverage scores of the complete kernel, `p` being the
/// current landmark count. The SVD is taken once; only the rank moves per step.
///
/// This is not the one-shot leverage algorithm, which fixes the rank to the final count.
pub struct LeverageFullIter {
    u: Option<DMatrix<f64>>,
    step_size: usize,
}

impl LeverageFullIter {
    pub fn new(kernel: &DMatrix<f64>, step_size: usize) -> Self {
        log::debug!("Computing full SVD of the {}x{} kernel", kernel.nrows(), kernel.ncols());
        LeverageFullIter { u: kernel.clone().svd(true, false).u, step_size }
    }
}

impl Selector for LeverageFullIter {
    fn pick(&mut self, picked: &PickedMask, rng: &mut dyn RngCore) -> Result<Selection, NystromError> {
        let u = self.u.as_ref().ok_or(NystromError::Decomposition("SVD"))?;
        let u_idx = picked.unpicked();
        let levs = leading_row_sq_norms(u, &u_idx, picked.count());
        let probs = normalized(levs.as_slice())?;
        let indices = pick_up_to(&u_idx, self.step_size, Some(&probs), rng)?;
        Ok(Selection::new(indices, EvalCost::Absolute(picked.len())))
    }
}

/// Samples by leverage scores estimated from the picked rows alone, so it never
/// uses entries of the unpicked x unpicked block.
pub struct LeverageEstimate<'a> {
    kernel: &'a DMatrix<f64>,
    step_size: usize,
    rcond: f64,
}

impl<'a> LeverageEstimate<'a> {
    pub fn new(kernel: &'a DMatrix<f64>, step_size: usize, rcond: f64) -> Self {
        LeverageEstimate { kernel, step_size, rcond }
    }
}

impl<'a> Selector for LeverageEstimate<'a> {
    fn pick(&mut self, picked: &PickedMask, rng: &mut dyn RngCore) -> Result<Selection, NystromError> {
        let p_idx = picked.picked();
        let u_idx = picked.unpicked();
        let a = block(self.kernel, &p_idx, &p_idx);
        let b = block(self.kernel, &p_idx, &u_idx);

        let levs = leverages_of_unknown(&a, &b, self.rcond)?;
        if levs.iter().any(|v| !v.is_finite()) {
            return Err(NystromError::NonFiniteScores);
        }
        // tiny negative scores are rounding noise
        let levs: Vec<f64> = levs.iter().map(|v| v.max(0.0)).collect();
        let probs = normalized(&levs)?;
        let indices = pick_up_to(&u_idx, self.step_size, Some(&probs), rng)?;
        Ok(Selection::new(indices, EvalCost::Default))
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::DMatrix;
    use super::{LeverageEstimate, LeverageFullIter};
    use crate::linalg::DEFAULT_RCOND;
    use crate::mask::PickedMask;
    use crate::select::{EvalCost, Selector};
    use crate::test_assist::{generate_rbf_kernel, seeded_rng};

    #[test]
    fn test_full_iter_prefers_high_leverage_item() {
        // item 3 carries its own direction; all others are a shared rank-one block
        let mut k = DMatrix::from_element(6, 6, 1.0);
        for j in 0..6 {
            k[(3, j)] = 0.0;
            k[(j, 3)] = 0.0;
        }
        k[(3, 3)] = 100.0;
        let mut sel = LeverageFullIter::new(&k, 1);
        let mask = PickedMask::from_indices(6, &[0]);
        let mut rng = seeded_rng(17);
        for _ in 0..10 {
            let out = sel.pick(&mask, &mut rng).unwrap();
            assert_eq!(out.indices, vec![3]);
            assert_eq!(out.cost, EvalCost::Absolute(6));
        }
    }

    #[test]
    fn test_estimate_maps_back_to_kernel_indices() {
        let mut rng = seeded_rng(4);
        let k = generate_rbf_kernel(18, 2, 1.0, &mut rng);
        let mask = PickedMask::from_indices(18, &[0, 1, 2, 3]);
        let mut sel = LeverageEstimate::new(&k, 5, DEFAULT_RCOND);
        let out = sel.pick(&mask, &mut rng).unwrap();
        assert_eq!(out.indices.len(), 5);
        assert!(out.indices.iter().all(|&i| i >= 4 && i < 18));
        assert_eq!(out.cost, EvalCost::Default);
    }
}
