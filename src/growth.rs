use nalgebra::DMatrix;
use rand::RngCore;
use serde::Serialize;

use crate::errors::NystromError;
use crate::mask::PickedMask;
use crate::nystrom::nys_error;
use crate::sample::uniform_seed;
use crate::select::{EvalCost, Method, Selector, SelectorOptions};

/// Landmark counts for one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthConfig {
    /// Size of the uniformly drawn initial landmark set.
    pub start_n: usize,
    /// Target landmark count; `None` runs until every item is picked.
    pub max_n: Option<usize>,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        GrowthConfig { start_n: 5, max_n: None }
    }
}

impl GrowthConfig {
    /// Checks `1 <= start_n <= max_n <= n` and returns the effective `max_n`.
    pub fn resolve_max_n(&self, n: usize) -> Result<usize, NystromError> {
        let max_n = self.max_n.unwrap_or(n);
        if self.start_n == 0 || self.start_n > max_n || max_n > n {
            return Err(NystromError::InvalidBounds { start_n: self.start_n, max_n, n });
        }
        Ok(max_n)
    }
}

/// One record per completed step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultRow {
    pub n_picked: usize,
    pub n_evaled: usize,
    pub rmse: f64,
}

/// Records of a sweep in the order they were produced.
///
/// `failure` holds the error that cut the sweep short, if any.
#[derive(Debug, Default)]
pub struct ResultSeries {
    pub rows: Vec<ResultRow>,
    pub failure: Option<NystromError>,
}

impl ResultSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&ResultRow> {
        self.rows.last()
    }
}

/// Receives the landmark count after every step.
pub trait Progress {
    fn start(&mut self, _total: usize) {}
    fn update(&mut self, n_picked: usize);
    fn finish(&mut self) {}
}

pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&mut self, _n_picked: usize) {}
}

pub fn check_square(kernel: &DMatrix<f64>) -> Result<usize, NystromError> {
    let (rows, cols) = kernel.shape();
    if rows != cols {
        return Err(NystromError::NotSquare { rows, cols });
    }
    if rows == 0 {
        return Err(NystromError::EmptyKernel);
    }
    Ok(rows)
}

/// Validates the whole configuration, builds the selector for `method` and runs the sweep.
pub fn run_method(
    kernel: &DMatrix<f64>,
    method: Method,
    config: &GrowthConfig,
    opts: &SelectorOptions,
    rng: &mut dyn RngCore,
    progress: &mut dyn Progress,
) -> Result<ResultSeries, NystromError> {
    let n = check_square(kernel)?;
    method.check_step_size(opts.step_size)?;
    config.resolve_max_n(n)?;

    log::info!(
        "Running `{}` on a {}x{} kernel (start_n={}, max_n={}, step_size={})",
        method,
        n,
        n,
        config.start_n,
        config.max_n.unwrap_or(n),
        opts.step_size
    );
    let mut selector = method.selector(kernel, opts)?;
    run(kernel, selector.as_mut(), config, rng, progress)
}

/**
Grows a landmark set from a random seed and records the Nystrom error after every step.

* Inputs:
`kernel` is the `n x n` matrix, `selector` the heuristic consulted once per step,
`rng` the only source of randomness for the run.

* Output:
The records of the initial set and of every completed step. Configuration errors are
returned as `Err` before any work is done. An error inside a step ends the sweep: it is
logged, stored in `failure`, and the rows gathered so far are returned.

A step either completes fully (mask grown and a row recorded) or leaves no trace.
 */
pub fn run<S: Selector + ?Sized>(
    kernel: &DMatrix<f64>,
    selector: &mut S,
    config: &GrowthConfig,
    rng: &mut dyn RngCore,
    progress: &mut dyn Progress,
) -> Result<ResultSeries, NystromError> {
    let n = check_square(kernel)?;
    let max_n = config.resolve_max_n(n)?;

    let mut picked = PickedMask::from_indices(n, &uniform_seed(n, config.start_n, rng));
    let start = picked.count();
    let mut series = ResultSeries::default();
    series.rows.push(ResultRow { n_picked: start, n_evaled: start, rmse: nys_error(kernel, &picked)? });

    progress.start(max_n);
    progress.update(start);

    while picked.count() < max_n {
        match step(kernel, selector, &picked, max_n, rng) {
            Ok((next, row)) => {
                log::debug!("n_picked={} n_evaled={} rmse={:e}", row.n_picked, row.n_evaled, row.rmse);
                picked = next;
                series.rows.push(row);
                progress.update(row.n_picked.min(max_n));
            }
            Err(e) => {
                log::error!(
                    "Step {} failed with {} landmarks picked, stopping early: {}",
                    series.rows.len(),
                    picked.count(),
                    e
                );
                series.failure = Some(e);
                break;
            }
        }
    }

    progress.finish();
    if let Some(last) = series.last() {
        log::info!("Finished with {} landmarks, rmse={:e}", last.n_picked, last.rmse);
    }
    Ok(series)
}

fn step<S: Selector + ?Sized>(
    kernel: &DMatrix<f64>,
    selector: &mut S,
    picked: &PickedMask,
    max_n: usize,
    rng: &mut dyn RngCore,
) -> Result<(PickedMask, ResultRow), NystromError> {
    let selection = selector.pick(picked, rng)?;

    let mut next = picked.clone();
    for &i in &selection.indices {
        assert!(i < next.len(), "selector returned index {} for a kernel of size {}", i, next.len());
        if next.count() == max_n {
            break;
        }
        next.insert(i);
    }
    if next.count() == picked.count() {
        return Err(NystromError::NoProgress);
    }

    let n_picked = next.count();
    let n_evaled = match selection.cost {
        EvalCost::Default => n_picked,
        EvalCost::Absolute(n) => n,
    };
    let rmse = nys_error(kernel, &next)?;
    Ok((next, ResultRow { n_picked, n_evaled, rmse }))
}
