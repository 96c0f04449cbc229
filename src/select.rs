use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use rand::RngCore;

use crate::adaptive::{AdaptiveSvd, ResidualWeighting};
use crate::determinantal::DeterminantGreedy;
use crate::errors::NystromError;
use crate::frobenius::FrobeniusGreedy;
use crate::leverage_select::{LeverageEstimate, LeverageFullIter};
use crate::linalg::DEFAULT_RCOND;
use crate::mask::PickedMask;
use crate::sample::pick_up_to;

/// How many kernel entries a step is charged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalCost {
    /// Only the picked rows/columns were read.
    Default,
    /// The selector inspected this many items in total.
    Absolute(usize),
}

/// Output of one selection step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub indices: Vec<usize>,
    pub cost: EvalCost,
}

impl Selection {
    pub fn new(indices: Vec<usize>, cost: EvalCost) -> Self {
        Selection { indices, cost }
    }
}

/// A landmark selection heuristic.
///
/// Implementations read the mask and return currently unpicked indices, at most the
/// configured step size of them. They never modify the mask.
pub trait Selector {
    fn pick(&mut self, picked: &PickedMask, rng: &mut dyn RngCore) -> Result<Selection, NystromError>;
}

/// Knobs shared by the heuristics that need them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorOptions {
    pub step_size: usize,
    /// Candidate pool drawn per step by the Frobenius-residual greedy rule.
    pub eval_size: usize,
    /// Number of residual singular vectors used by `adapt_full_lev`; `None` means one per landmark.
    pub residual_rank: Option<usize>,
    pub rcond: f64,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        SelectorOptions { step_size: 1, eval_size: 59, residual_rank: None, rcond: DEFAULT_RCOND }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Uniform,
    AdaptFull,
    AdaptFullLev,
    LeverageFullIter,
    LeverageEst,
    DeterminantGreedy,
    DeterminantGreedySamp,
    SmgaFrob,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Uniform,
        Method::AdaptFull,
        Method::AdaptFullLev,
        Method::LeverageFullIter,
        Method::LeverageEst,
        Method::DeterminantGreedy,
        Method::DeterminantGreedySamp,
        Method::SmgaFrob,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Method::Uniform => "uniform",
            Method::AdaptFull => "adapt_full",
            Method::AdaptFullLev => "adapt_full_lev",
            Method::LeverageFullIter => "leverage_full_iter",
            Method::LeverageEst => "leverage_est",
            Method::DeterminantGreedy => "determinant_greedy",
            Method::DeterminantGreedySamp => "determinant_greedy_samp",
            Method::SmgaFrob => "smga_frob",
        }
    }

    /// Methods that add exactly one landmark per step.
    pub fn requires_unit_step(self) -> bool {
        matches!(self, Method::DeterminantGreedy | Method::DeterminantGreedySamp | Method::SmgaFrob)
    }

    pub fn check_step_size(self, step_size: usize) -> Result<(), NystromError> {
        if step_size == 0 {
            return Err(NystromError::ZeroStepSize);
        }
        if self.requires_unit_step() && step_size != 1 {
            return Err(NystromError::StepSizeUnsupported { method: self.name(), step_size });
        }
        Ok(())
    }

    /// Builds the selector for this method over `kernel`.
    ///
    /// `leverage_full_iter` does its full SVD of `kernel` here, once per run.
    pub fn selector<'a>(self, kernel: &'a DMatrix<f64>, opts: &SelectorOptions) -> Result<Box<dyn Selector + 'a>, NystromError> {
        self.check_step_size(opts.step_size)?;
        let step_size = opts.step_size;
        Ok(match self {
            Method::Uniform => Box::new(Uniform { step_size }),
            Method::AdaptFull => Box::new(AdaptiveSvd::new(kernel, step_size, ResidualWeighting::RowNorms)),
            Method::AdaptFullLev => Box::new(AdaptiveSvd::new(
                kernel,
                step_size,
                ResidualWeighting::Leverage { rank: opts.residual_rank },
            )),
            Method::LeverageFullIter => Box::new(LeverageFullIter::new(kernel, step_size)),
            Method::LeverageEst => Box::new(LeverageEstimate::new(kernel, step_size, opts.rcond)),
            Method::DeterminantGreedy => Box::new(DeterminantGreedy::new(kernel, false)),
            Method::DeterminantGreedySamp => Box::new(DeterminantGreedy::new(kernel, true)),
            Method::SmgaFrob => Box::new(FrobeniusGreedy::new(kernel, opts.eval_size)),
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = NystromError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "kmeans" {
            return Err(NystromError::UnsupportedMethod(s.to_string()));
        }
        Method::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| NystromError::UnknownMethod(s.to_string()))
    }
}

/// Uniformly random unpicked indices.
pub struct Uniform {
    pub step_size: usize,
}

impl Selector for Uniform {
    fn pick(&mut self, picked: &PickedMask, rng: &mut dyn RngCore) -> Result<Selection, NystromError> {
        let indices = pick_up_to(&picked.unpicked(), self.step_size, None, rng)?;
        Ok(Selection::new(indices, EvalCost::Default))
    }
}
