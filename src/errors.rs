use thiserror::Error;

/// Everything that can go wrong while configuring or running a landmark sweep.
///
/// The first group of variants is raised before any iteration starts and is
/// fatal. The second group can only happen inside a growth step; the growth
/// loop logs those and returns the rows collected so far.
#[derive(Error, Debug)]
pub enum NystromError {
    #[error("Kernel matrix must be square, found matrix with {rows} rows and {cols} columns")]
    NotSquare { rows: usize, cols: usize },

    #[error("Kernel matrix is empty")]
    EmptyKernel,

    #[error("Unknown method `{0}`")]
    UnknownMethod(String),

    #[error("Method `{0}` is not part of the iterative sampler and cannot be run here")]
    UnsupportedMethod(String),

    #[error("Landmark counts must satisfy 1 <= start_n ({start_n}) <= max_n ({max_n}) <= n ({n})")]
    InvalidBounds { start_n: usize, max_n: usize, n: usize },

    #[error("Step size must be at least 1")]
    ZeroStepSize,

    #[error("Method `{method}` picks one landmark per step, but step size {step_size} was requested")]
    StepSizeUnsupported { method: &'static str, step_size: usize },

    #[error("Leverage scores contain non-finite values")]
    NonFiniteScores,

    #[error("No probability mass left to sample from")]
    ExhaustedSupport,

    #[error("{0} failed")]
    Decomposition(&'static str),

    #[error("Weighted sampling failed: {0}")]
    Sampling(#[from] rand_distr::WeightedError),

    #[error("Got {weights} sampling weights for {candidates} candidates")]
    WeightMismatch { weights: usize, candidates: usize },

    #[error("Selector returned no new landmarks")]
    NoProgress,
}

impl NystromError {
    /// True for configuration problems that must stop a run before it starts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            NystromError::NotSquare { .. }
                | NystromError::EmptyKernel
                | NystromError::UnknownMethod(_)
                | NystromError::UnsupportedMethod(_)
                | NystromError::InvalidBounds { .. }
                | NystromError::ZeroStepSize
                | NystromError::StepSizeUnsupported { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::NystromError;

    #[test]
    fn test_taxonomy() {
        assert!(NystromError::NotSquare { rows: 3, cols: 4 }.is_validation());
        assert!(NystromError::StepSizeUnsupported { method: "determinant_greedy", step_size: 2 }.is_validation());
        assert!(!NystromError::NonFiniteScores.is_validation());
        assert!(!NystromError::Decomposition("Cholesky").is_validation());
    }

    #[test]
    fn test_messages() {
        let err = NystromError::NotSquare { rows: 3, cols: 4 };
        assert_eq!(err.to_string(), "Kernel matrix must be square, found matrix with 3 rows and 4 columns");
        assert_eq!(NystromError::Decomposition("Cholesky").to_string(), "Cholesky failed");
    }
}
