use nalgebra::DMatrix;
use rand::RngCore;
use crate::errors::NystromError;
use crate::mask::PickedMask;
use crate::nystrom::nystrom_reconstruction;
use crate::sample::pick_up_to;
use crate::select::{EvalCost, Selection, Selector};

/// Greedy reduction of the Frobenius residual over a random candidate pool.
///
/// Each step draws up to `eval_size` unpicked candidates, scores candidate `i` by
/// `||(E E)[i, :]||^2 / ||E[i, :]||^2` with `E = K - K_hat`, and picks the best.
/// Every candidate ever scored counts as evaluated.
pub struct FrobeniusGreedy<'a> {
    kernel: &'a DMatrix<f64>,
    eval_size: usize,
    evaluated: PickedMask,
}

impl<'a> FrobeniusGreedy<'a> {
    pub fn new(kernel: &'a DMatrix<f64>, eval_size: usize) -> Self {
        FrobeniusGreedy { kernel, eval_size, evaluated: PickedMask::new(kernel.nrows()) }
    }

    pub fn evaluated(&self) -> &PickedMask {
        &self.evaluated
    }
}

/// Improvement factor of each pool member; zero-residual rows score 0.
fn improvement_factors(err: &DMatrix<f64>, pool: &[usize]) -> Vec<f64> {
    let err_prods = err * err;
    pool.iter()
        .map(|&i| {
            let denom = err.row(i).norm_squared();
            if denom > 0.0 {
                err_prods.row(i).norm_squared() / denom
            } else {
                0.0
            }
        })
        .collect()
}

impl<'a> Selector for FrobeniusGreedy<'a> {
    fn pick(&mut self, picked: &PickedMask, rng: &mut dyn RngCore) -> Result<Selection, NystromError> {
        self.evaluated.insert_all(&picked.picked());

        let pool = pick_up_to(&picked.unpicked(), self.eval_size, None, rng)?;
        if pool.is_empty() {
            return Err(NystromError::ExhaustedSupport);
        }
        self.evaluated.insert_all(&pool);

        let err = self.kernel - nystrom_reconstruction(self.kernel, picked)?;
        let factors = improvement_factors(&err, &pool);
        if factors.iter().any(|f| !f.is_finite()) {
            return Err(NystromError::NonFiniteScores);
        }
        let best = factors
            .iter()
            .enumerate()
            .fold(0, |best, (j, f)| if *f > factors[best] { j } else { best });

        Ok(Selection::new(vec![pool[best]], EvalCost::Absolute(self.evaluated.count())))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, DMatrix};
    use super::{improvement_factors, FrobeniusGreedy};
    use crate::mask::PickedMask;
    use crate::select::{EvalCost, Selector};
    use crate::test_assist::{generate_rbf_kernel, seeded_rng};

    #[test]
    fn test_factors_by_hand() {
        let err = dmatrix![2.0, 0.0; 0.0, 0.0];
        let f = improvement_factors(&err, &[0, 1]);
        // (E E)[0, :] = [4, 0]; ||.||^2 = 16, ||E[0, :]||^2 = 4
        assert_relative_eq!(f[0], 4.0);
        assert_eq!(f[1], 0.0);
    }

    #[test]
    fn test_evaluated_grows_with_pool() {
        let mut rng = seeded_rng(3);
        let k = generate_rbf_kernel(20, 2, 1.0, &mut rng);
        let mut mask = PickedMask::from_indices(20, &[0, 1]);
        let mut sel = FrobeniusGreedy::new(&k, 4);

        let out = sel.pick(&mask, &mut rng).unwrap();
        assert_eq!(out.cost, EvalCost::Absolute(6));
        assert_eq!(out.indices.len(), 1);
        assert!(!mask.is_picked(out.indices[0]));
        mask.insert_all(&out.indices);

        let out = sel.pick(&mask, &mut rng).unwrap();
        match out.cost {
            EvalCost::Absolute(n) => assert!(n >= 6 && n <= 10),
            EvalCost::Default => panic!("expected an absolute cost"),
        }
        assert!(sel.evaluated().count() <= 20);
    }

    #[test]
    fn test_full_pool_picks_unexplained_block() {
        let mut k = DMatrix::<f64>::identity(5, 5);
        k[(3, 3)] = 10.0;
        let mut sel = FrobeniusGreedy::new(&k, 59);
        let mut rng = seeded_rng(8);
        let out = sel.pick(&PickedMask::from_indices(5, &[0]), &mut rng).unwrap();
        assert_eq!(out.indices, vec![3]);
        assert_eq!(out.cost, EvalCost::Absolute(5));
    }
}
