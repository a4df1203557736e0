//! Error handling for the capital-gains calculator
//!
//! Defines the error taxonomy for one input batch and establishes a unified
//! Result type using anyhow for context chaining in the binary.

use rust_decimal::Decimal;
use thiserror::Error;

/// An operation the calculator refuses to apply when strict validation is on
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("negative quantity: {0}")]
    NegativeQuantity(i64),

    #[error("negative unit cost: {0}")]
    NegativeUnitCost(Decimal),

    #[error("insufficient shares: selling {requested} but only {held} held")]
    InsufficientShares { requested: i64, held: i64 },

    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

/// Core error types for batch processing
#[derive(Error, Debug)]
pub enum CapitalGainsError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("invalid operation #{index}: {source}")]
    Domain {
        index: usize,
        #[source]
        source: DomainError,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

impl CapitalGainsError {
    /// Whether the line loop may skip the offending batch and keep reading
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CapitalGainsError::Parse(_)
                | CapitalGainsError::Encode(_)
                | CapitalGainsError::Domain { .. }
        )
    }
}

/// Result type alias for application-level plumbing
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = CapitalGainsError::Parse("expected value at line 1 column 1".to_string());
        assert_eq!(
            err.to_string(),
            "parse error: expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_domain_error_carries_operation_index() {
        let err = CapitalGainsError::Domain {
            index: 2,
            source: DomainError::InsufficientShares {
                requested: 50,
                held: 10,
            },
        };
        assert_eq!(
            err.to_string(),
            "invalid operation #2: insufficient shares: selling 50 but only 10 held"
        );
    }

    #[test]
    fn test_overflow_is_recoverable() {
        let err = CapitalGainsError::Domain {
            index: 0,
            source: DomainError::Overflow("sale value"),
        };
        assert!(err.is_recoverable());
        assert!(err.to_string().ends_with("arithmetic overflow computing sale value"));
    }

    #[test]
    fn test_recoverable_variants() {
        assert!(CapitalGainsError::Parse("x".to_string()).is_recoverable());
        assert!(CapitalGainsError::Encode("x".to_string()).is_recoverable());
        assert!(!CapitalGainsError::Config("x".to_string()).is_recoverable());

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert!(!CapitalGainsError::from(io).is_recoverable());
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(anyhow::anyhow!("original error")).context("failed to read input");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to read input"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("original error"));
            }
            Ok(_) => panic!("expected error"),
        }
    }
}
