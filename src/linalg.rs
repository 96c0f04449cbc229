use nalgebra::{DMatrix, DVector};
use crate::errors::NystromError;

/// Default cutoff for small singular values, relative to the largest one.
pub const DEFAULT_RCOND: f64 = 1e-15;

/**
Moore-Penrose pseudo-inverse with a relative singular-value cutoff.

* Inputs:
`m` is an `r x c` matrix, `rcond` is the relative cutoff.

* Output:
The `c x r` pseudo-inverse. Singular values at or below `rcond * max(singular values)`
are treated as exactly zero, so rank-deficient inputs are handled without error.
 */
pub fn pinv(m: &DMatrix<f64>, rcond: f64) -> Result<DMatrix<f64>, NystromError> {
    if m.is_empty() {
        return Ok(DMatrix::zeros(m.ncols(), m.nrows()));
    }
    let svd = m.clone().svd(true, true);
    let cutoff = svd.singular_values.max() * rcond;
    svd.pseudo_inverse(cutoff)
        .map_err(|_| NystromError::Decomposition("SVD pseudo-inverse"))
}

/**
Pseudo-inverse of the square root of a symmetric PSD matrix.

Negative eigenvalues are taken to be numerical noise and clamped to zero. Square-rooted
eigenvalues below `max * rcond` are truncated: both the value and its inverse become zero.
 */
pub fn psd_inverse_sqrt(a: &DMatrix<f64>, rcond: f64) -> DMatrix<f64> {
    if a.is_empty() {
        return DMatrix::zeros(a.nrows(), a.ncols());
    }
    let eig = a.clone().symmetric_eigen();
    let roots = eig.eigenvalues.map(|v| v.max(0.0).sqrt());
    let cutoff = roots.max() * rcond;
    let inv_roots = roots.map(|v| if v < cutoff || v == 0.0 { 0.0 } else { v.recip() });

    let vecs = &eig.eigenvectors;
    let mut scaled_t = vecs.transpose();
    for (i, mut row) in scaled_t.row_iter_mut().enumerate() {
        row *= inv_roots[i];
    }
    vecs * scaled_t
}

/// Rows `rows` and columns `cols` of `m`, in the order given.
pub fn block(m: &DMatrix<f64>, rows: &[usize], cols: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), cols.len(), |i, j| m[(rows[i], cols[j])])
}

/// Squared Euclidean norm of each of the given rows.
pub fn row_sq_norms(m: &DMatrix<f64>, rows: &[usize]) -> DVector<f64> {
    DVector::from_iterator(rows.len(), rows.iter().map(|&i| m.row(i).norm_squared()))
}

/// Squared norm of the first `k` entries of each of the given rows.
pub fn leading_row_sq_norms(m: &DMatrix<f64>, rows: &[usize], k: usize) -> DVector<f64> {
    let k = k.min(m.ncols());
    DVector::from_iterator(
        rows.len(),
        rows.iter().map(|&i| m.view((i, 0), (1, k)).norm_squared()),
    )
}
