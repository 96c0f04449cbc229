use nalgebra::DMatrix;
use crate::errors::NystromError;
use crate::linalg::{block, pinv, DEFAULT_RCOND};
use crate::mask::PickedMask;

/**
Frobenius error of the Nystrom approximation of `k` built from the picked rows/columns.

* Inputs:
`k` is the full `n x n` kernel matrix, `picked` the current landmark set.

* Output:
`sqrt(2 ||A A+ B - B||_F^2 + ||B^T A+ B - C||_F^2)` where `A`, `B`, `C` are the
picked x picked, picked x unpicked and unpicked x unpicked blocks. The off-diagonal
block is counted twice since it appears on both sides of the diagonal.

Cost is one pseudo-inverse of a `p x p` block plus the products, `O(p^3 + p^2 n)`
for `p` landmarks, with the `C` comparison adding `O(p (n-p)^2)`. This runs once per
growth step and dominates the sweep for large `p`.
 */
pub fn nys_error(k: &DMatrix<f64>, picked: &PickedMask) -> Result<f64, NystromError> {
    let p_idx = picked.picked();
    let u_idx = picked.unpicked();

    let a = block(k, &p_idx, &p_idx);
    let b = block(k, &p_idx, &u_idx);
    let c = block(k, &u_idx, &u_idx);

    let a_pinv = pinv(&a, DEFAULT_RCOND)?;
    let a_pinv_b = &a_pinv * &b;

    let b_hat = &a * &a_pinv_b;
    let b_err = (b_hat - &b).norm_squared();

    let c_hat = b.transpose() * &a_pinv_b;
    let c_err = (c_hat - c).norm_squared();

    Ok((2.0 * b_err + c_err).sqrt())
}

/// Full `n x n` Nystrom reconstruction: picked rows and columns are copied from `k`,
/// the unpicked block is `B^T A+ B`.
pub fn nystrom_reconstruction(k: &DMatrix<f64>, picked: &PickedMask) -> Result<DMatrix<f64>, NystromError> {
    let p_idx = picked.picked();
    let u_idx = picked.unpicked();

    let a = block(k, &p_idx, &p_idx);
    let b = block(k, &p_idx, &u_idx);
    let c_hat = b.transpose() * pinv(&a, DEFAULT_RCOND)? * &b;

    let mut out = k.clone();
    for (ui, &i) in u_idx.iter().enumerate() {
        for (uj, &j) in u_idx.iter().enumerate() {
            out[(i, j)] = c_hat[(ui, uj)];
        }
    }
    Ok(out)
}
