//! Error types for the STOGO-NLOPT implementation.
//!
//! The core adapter reports only a found/not-found flag. These types belong to
//! the validating layers above it (builder and C entry points) and mirror the
//! subset of NLOPT's `nlopt_result` that a StoGO run can produce.

use thiserror::Error;

/// Return codes matching NLOPT's `nlopt_result` enum.
///
/// Negative values indicate errors, positive values indicate successful termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StogoReturnCode {
    /// No feasible minimizer was observed (NLOPT_FAILURE)
    Failure = -1,
    /// Invalid arguments (NLOPT_INVALID_ARGS)
    InvalidArgs = -2,
    /// Forced stop via the stopping criteria (NLOPT_FORCED_STOP)
    ForcedStop = -5,

    /// Search space exhausted (NLOPT_SUCCESS)
    Success = 1,
    /// Stop value reached (NLOPT_STOPVAL_REACHED)
    StopvalReached = 2,
    /// Maximum function evaluations reached (NLOPT_MAXEVAL_REACHED)
    MaxEvalReached = 5,
    /// Maximum time reached (NLOPT_MAXTIME_REACHED)
    MaxTimeReached = 6,
}

impl StogoReturnCode {
    /// Returns true if this is a successful termination (positive code).
    pub fn is_success(&self) -> bool {
        (*self as i32) > 0
    }

    /// Returns true if this is an error (negative code).
    pub fn is_error(&self) -> bool {
        (*self as i32) < 0
    }

    /// Convert from integer code (matching NLOPT convention).
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Failure),
            -2 => Some(Self::InvalidArgs),
            -5 => Some(Self::ForcedStop),
            1 => Some(Self::Success),
            2 => Some(Self::StopvalReached),
            5 => Some(Self::MaxEvalReached),
            6 => Some(Self::MaxTimeReached),
            _ => None,
        }
    }
}

/// Errors raised by the validating layer before a search is started.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StogoError {
    #[error("Invalid bounds: lower bound > upper bound in dimension {dim}")]
    InvalidBounds { dim: usize },

    #[error("Finite domain required: bound in dimension {dim} is not finite")]
    InfiniteBounds { dim: usize },

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
}

impl StogoError {
    /// The NLOPT return code reported for this error across the C boundary.
    pub fn return_code(&self) -> StogoReturnCode {
        StogoReturnCode::InvalidArgs
    }
}

/// Result type alias for STOGO operations.
pub type Result<T> = std::result::Result<T, StogoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_code_roundtrip_values() {
        for code in [
            StogoReturnCode::Failure,
            StogoReturnCode::InvalidArgs,
            StogoReturnCode::ForcedStop,
            StogoReturnCode::Success,
            StogoReturnCode::StopvalReached,
            StogoReturnCode::MaxEvalReached,
            StogoReturnCode::MaxTimeReached,
        ] {
            assert_eq!(StogoReturnCode::from_i32(code as i32), Some(code));
        }
        assert_eq!(StogoReturnCode::from_i32(3), None);
        assert_eq!(StogoReturnCode::from_i32(-100), None);
    }

    #[test]
    fn test_return_code_classification() {
        assert!(StogoReturnCode::Success.is_success());
        assert!(StogoReturnCode::MaxEvalReached.is_success());
        assert!(!StogoReturnCode::Failure.is_success());
        assert!(StogoReturnCode::ForcedStop.is_error());
        assert!(!StogoReturnCode::MaxTimeReached.is_error());
    }

    #[test]
    fn test_error_messages() {
        let e = StogoError::InvalidBounds { dim: 2 };
        assert_eq!(
            e.to_string(),
            "Invalid bounds: lower bound > upper bound in dimension 2"
        );
        let e = StogoError::InfiniteBounds { dim: 0 };
        assert!(e.to_string().contains("dimension 0"));
        assert_eq!(e.return_code(), StogoReturnCode::InvalidArgs);
    }
}
