//! Error types for the BCD solver.

use thiserror::Error;

/// Errors that can occur while setting up or running a solve.
#[derive(Error, Debug)]
pub enum BcdError {
    /// Invalid settings or problem data (bad dimensions, non-positive penalty,
    /// gap requested before any bounds were recorded, ...).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The block oracle could not produce an assignment.
    #[error("Oracle failed on block {block}: {source}")]
    Oracle {
        /// Block whose subproblem failed.
        block: usize,
        /// Underlying oracle failure.
        #[source]
        source: OracleError,
    },

    /// Non-finite costs, objectives or penalty weights.
    #[error("Numerical error: {0}")]
    Numerical(String),
}

/// Failures reported by a block oracle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// The oracle found no assignment for a well-formed cost vector.
    #[error("no assignment found: {0}")]
    NoAssignment(String),

    /// The returned assignment has the wrong length.
    #[error("assignment has length {got}, expected {expected}")]
    DimensionMismatch {
        /// Column count of the block.
        expected: usize,
        /// Length returned by the oracle.
        got: usize,
    },

    /// The returned assignment has an entry that is not 0 or 1.
    #[error("assignment entry {index} is {value}, expected 0 or 1")]
    NonBinary {
        /// Offending column.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// Any other failure inside the oracle.
    #[error("{0}")]
    Failed(String),
}

impl BcdError {
    /// Wrap an oracle failure with the block it happened on.
    pub fn oracle(block: usize, source: OracleError) -> Self {
        BcdError::Oracle { block, source }
    }
}

/// Result type for BCD operations.
pub type BcdResult<T> = Result<T, BcdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BcdError::Configuration("rho must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: rho must be positive");

        let err = BcdError::oracle(3, OracleError::DimensionMismatch { expected: 4, got: 2 });
        assert_eq!(
            err.to_string(),
            "Oracle failed on block 3: assignment has length 2, expected 4"
        );
    }

    #[test]
    fn test_oracle_source_is_exposed() {
        use std::error::Error;

        let err = BcdError::oracle(0, OracleError::Failed("timeout".to_string()));
        let source = err.source().expect("oracle error should carry a source");
        assert_eq!(source.to_string(), "timeout");
    }
}
