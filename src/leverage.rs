use nalgebra::{DMatrix, DVector};
use crate::errors::NystromError;
use crate::linalg::{pinv, psd_inverse_sqrt};

/**
Approximate leverage scores of the unpicked columns, without looking at the
unpicked x unpicked block.

* Inputs:
`a` is the `p x p` picked block, `b` the `p x u` picked x unpicked block,
`rcond` the relative rank cutoff used for `A^{-1/2}` and the pseudo-inverse.

* Output:
A length-`u` vector with entry `i` equal to `X_i^T Y X_i`, where `X = A^{-1/2} B`
and `Y = pinv(A + X X^T)`.

The quadratic forms are evaluated for all columns at once as the column sums of `X .* (Y X)`.
 */
pub fn leverages_of_unknown(a: &DMatrix<f64>, b: &DMatrix<f64>, rcond: f64) -> Result<DVector<f64>, NystromError> {
    let x = psd_inverse_sqrt(a, rcond) * b;
    let s = a + &x * x.transpose();
    let y = pinv(&s, rcond)?;
    let yx = &y * &x;
    Ok(x.component_mul(&yx).row_sum().transpose())
}

/// Same scores as [`leverages_of_unknown`], using `x^T S^{-1} x = ||L^{-1} x||^2` with
/// `S = L L^T` in place of the pseudo-inverse. Requires `A + X X^T` to be positive definite.
pub fn leverages_of_unknown_cholesky(a: &DMatrix<f64>, b: &DMatrix<f64>, rcond: f64) -> Result<DVector<f64>, NystromError> {
    let x = psd_inverse_sqrt(a, rcond) * b;
    let s = a + &x * x.transpose();
    let chol = s.cholesky().ok_or(NystromError::Decomposition("Cholesky"))?;
    let solved = chol
        .l()
        .solve_lower_triangular(&x)
        .ok_or(NystromError::Decomposition("Triangular solve"))?;
    Ok(solved.component_mul(&solved).row_sum().transpose())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;
    use super::{leverages_of_unknown, leverages_of_unknown_cholesky};
    use crate::linalg::{block, DEFAULT_RCOND};
    use crate::test_assist::{generate_rbf_kernel, seeded_rng};

    fn split(k: &DMatrix<f64>, picked: &[usize]) -> (DMatrix<f64>, DMatrix<f64>) {
        let unpicked: Vec<usize> = (0..k.nrows()).filter(|i| !picked.contains(i)).collect();
        (block(k, picked, picked), block(k, picked, &unpicked))
    }

    #[test]
    fn test_scores_shape_and_sign() {
        let mut rng = seeded_rng(21);
        let k = generate_rbf_kernel(30, 3, 1.5, &mut rng);
        let picked = [0, 4, 9, 13, 27];
        let (a, b) = split(&k, &picked);
        let levs = leverages_of_unknown(&a, &b, DEFAULT_RCOND).unwrap();
        assert_eq!(levs.len(), 25);
        assert!(levs.iter().all(|v| v.is_finite() && *v >= -1e-10));
    }

    #[test]
    fn test_scores_by_hand() {
        // A = I, so X = B and S = I + B B^T
        let a = DMatrix::<f64>::identity(1, 1);
        let b = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let levs = leverages_of_unknown(&a, &b, DEFAULT_RCOND).unwrap();
        // S = 1 + 1 + 4 = 6
        assert_relative_eq!(levs[0], 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(levs[1], 4.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nothing_unpicked() {
        let a = DMatrix::<f64>::identity(3, 3);
        let b = DMatrix::<f64>::zeros(3, 0);
        assert_eq!(leverages_of_unknown(&a, &b, DEFAULT_RCOND).unwrap().len(), 0);
    }

    #[test]
    fn test_cholesky_variant_agrees_on_well_conditioned_block() {
        let mut rng = seeded_rng(8);
        let k = generate_rbf_kernel(20, 4, 2.0, &mut rng) + DMatrix::<f64>::identity(20, 20) * 0.1;
        let (a, b) = split(&k, &[2, 5, 11, 16]);
        let eig = leverages_of_unknown(&a, &b, DEFAULT_RCOND).unwrap();
        let chol = leverages_of_unknown_cholesky(&a, &b, DEFAULT_RCOND).unwrap();
        assert_eq!(eig.len(), chol.len());
        for (e, c) in eig.iter().zip(chol.iter()) {
            assert_relative_eq!(e, c, epsilon = 1e-8);
        }
    }
}
