use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Generates a random matrix of size (rows, cols) with normally distributed elems
pub fn generate_random_matrix<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> DMatrix<f64> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    DMatrix::from_fn(rows, cols, |_, _| normal.sample(rng))
}

/// Generates a random psd matrix of size (n, n) as G G^T with G normally distributed
pub fn generate_random_psd_matrix<R: Rng + ?Sized>(n: usize, rng: &mut R) -> DMatrix<f64> {
    let g = generate_random_matrix(n, n, rng);
    &g * g.transpose()
}

/// Gaussian kernel over `n` random points in `dim` dimensions
pub fn generate_rbf_kernel<R: Rng + ?Sized>(n: usize, dim: usize, bandwidth: f64, rng: &mut R) -> DMatrix<f64> {
    let points = generate_random_matrix(n, dim, rng);
    DMatrix::from_fn(n, n, |i, j| {
        let d2 = (points.row(i) - points.row(j)).norm_squared();
        (-d2 / (2.0 * bandwidth * bandwidth)).exp()
    })
}

/// v v^T for a fixed v with no zero entries
pub fn generate_rank_one_matrix(n: usize) -> DMatrix<f64> {
    let v = DVector::from_fn(n, |i, _| if i % 2 == 0 { 1.0 + i as f64 } else { 0.5 * i as f64 });
    &v * v.transpose()
}

pub fn check_approx_equal(a: &DMatrix<f64>, b: &DMatrix<f64>, tolerance: f64) -> bool {
    if a.shape() != b.shape() {
        return false;
    }

    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            if (a[(i, j)] - b[(i, j)]).abs() > tolerance {
                return false;
            }
        }
    }

    true
}
