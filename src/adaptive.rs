use nalgebra::DMatrix;
use rand::RngCore;
use crate::errors::NystromError;
use crate::linalg::{leading_row_sq_norms, row_sq_norms};
use crate::mask::PickedMask;
use crate::sample::{normalized, pick_up_to};
use crate::select::{EvalCost, Selection, Selector};

/// How the residual `K - U U^T K` is turned into sampling weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidualWeighting {
    /// Squared residual row norms.
    RowNorms,
    /// Squared row entries of the leading left singular vectors of the residual.
    /// The rank has no principled value; `None` uses the current landmark count.
    Leverage { rank: Option<usize> },
}

/// Adaptive sampling against the projection of `K` onto its picked columns.
///
/// Reads the whole kernel every step, so each step is charged `n` entries.
pub struct AdaptiveSvd<'a> {
    kernel: &'a DMatrix<f64>,
    step_size: usize,
    weighting: ResidualWeighting,
}

impl<'a> AdaptiveSvd<'a> {
    pub fn new(kernel: &'a DMatrix<f64>, step_size: usize, weighting: ResidualWeighting) -> Self {
        AdaptiveSvd { kernel, step_size, weighting }
    }

    /// `K - U U^T K` with `U` the left singular vectors of `K[:, picked]`.
    fn residual(&self, p_idx: &[usize]) -> Result<DMatrix<f64>, NystromError> {
        let cols = self.kernel.select_columns(p_idx);
        let u = cols.svd(true, false).u.ok_or(NystromError::Decomposition("SVD"))?;
        let proj = &u * (u.transpose() * self.kernel);
        Ok(self.kernel - proj)
    }
}

impl<'a> Selector for AdaptiveSvd<'a> {
    fn pick(&mut self, picked: &PickedMask, rng: &mut dyn RngCore) -> Result<Selection, NystromError> {
        let n = picked.len();
        let p_idx = picked.picked();
        let u_idx = picked.unpicked();
        let err = self.residual(&p_idx)?;

        let scores = match self.weighting {
            ResidualWeighting::RowNorms => row_sq_norms(&err, &u_idx),
            ResidualWeighting::Leverage { rank } => {
                let err_u = err.svd(true, false).u.ok_or(NystromError::Decomposition("SVD"))?;
                leading_row_sq_norms(&err_u, &u_idx, rank.unwrap_or(p_idx.len()))
            }
        };
        log::trace!("adaptive residual mass over {} unpicked rows: {:e}", u_idx.len(), scores.sum());

        let probs = normalized(scores.as_slice())?;
        let indices = pick_up_to(&u_idx, self.step_size, Some(&probs), rng)?;
        Ok(Selection::new(indices, EvalCost::Absolute(n)))
    }
}
