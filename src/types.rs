//! Core type definitions for the STOGO-NLOPT implementation.
//!
//! Maps to NLOPT's StoGO API types: algorithm variants, evaluation mode,
//! options, and result structures.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::StogoReturnCode;

// ──────────────────────────────────────────────────────────────────────────────
// Evaluation mode
// ──────────────────────────────────────────────────────────────────────────────

/// What a single objective call must compute.
///
/// Matches StoGO's `whichO` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalMode {
    ObjectiveOnly,
    GradientOnly,
    ObjectiveAndGradient,
}

impl EvalMode {
    /// True when the callback must fill a gradient buffer.
    pub fn needs_gradient(&self) -> bool {
        !matches!(self, Self::ObjectiveOnly)
    }
}

impl fmt::Display for EvalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectiveOnly => write!(f, "OBJECTIVE_ONLY"),
            Self::GradientOnly => write!(f, "GRADIENT_ONLY"),
            Self::ObjectiveAndGradient => write!(f, "OBJECTIVE_AND_GRADIENT"),
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Algorithm Variants
// ──────────────────────────────────────────────────────────────────────────────

/// StoGO variant selection.
///
/// The two variants differ only in how many of the `2n + 1` initial sample
/// points per box are randomized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StogoAlgorithm {
    /// All sample points deterministic.
    /// NLOPT: `NLOPT_GD_STOGO`, `nrandom = 0`.
    #[default]
    Stogo,

    /// Randomized sample points.
    /// NLOPT: `NLOPT_GD_STOGO_RAND`, `nrandom = population` or `2n` when unset.
    StogoRand,
}

impl StogoAlgorithm {
    /// Number of randomized sample points for an `n`-dimensional problem.
    ///
    /// `population == 0` means "unset", matching NLOPT's `POP(2 * n)`.
    pub fn nrandom(&self, n: usize, population: usize) -> usize {
        match self {
            Self::Stogo => 0,
            Self::StogoRand => {
                if population > 0 {
                    population
                } else {
                    2 * n
                }
            }
        }
    }

    /// Returns the NLOPT algorithm name string.
    pub fn nlopt_name(&self) -> &'static str {
        match self {
            Self::Stogo => "GD_STOGO",
            Self::StogoRand => "GD_STOGO_RAND",
        }
    }
}

impl fmt::Display for StogoAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nlopt_name())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Type Aliases
// ──────────────────────────────────────────────────────────────────────────────

/// Bounds for each dimension: `Vec<(lower, upper)>`.
pub type Bounds = Vec<(f64, f64)>;

/// Objective with optional gradient output.
///
/// Matches NLOPT's `nlopt_func` minus the user-data pointer, which a closure captures:
/// - `x`: current point (dimension n)
/// - `grad`: `Some` when the caller asked for the gradient, to be filled with ∂f/∂x
/// - Returns: function value
pub type ObjectiveFn = dyn Fn(&[f64], Option<&mut [f64]>) -> f64 + Send + Sync;

// ──────────────────────────────────────────────────────────────────────────────
// Options
// ──────────────────────────────────────────────────────────────────────────────

/// Configuration options for the StoGO optimizer.
///
/// The sampling and clustering constants are passed to the engine as-is.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StogoOptions {
    /// Maximum number of function evaluations. 0 means no limit.
    pub max_eval: usize,

    /// Maximum wall-clock time in seconds. 0.0 means no limit.
    pub max_time: f64,

    /// Stop once a feasible value `<= stopval` is found.
    /// Default: `f64::NEG_INFINITY` (disabled), serialized as `null`.
    #[cfg_attr(feature = "serde", serde(with = "stopval_serde"))]
    pub stopval: f64,

    /// Algorithm variant to use.
    pub algorithm: StogoAlgorithm,

    /// Population used by `StogoRand` for `nrandom`. 0 means `2n`.
    pub population: usize,

    /// Override for the number of deterministic sample points per box.
    /// `None` keeps StoGO's `2n + 1 - nrandom`.
    pub det_pnts: Option<usize>,

    /// Relative clustering distance: samples closer than this to a known
    /// minimizer do not start a new local search. Default: 0.1.
    pub eps_cl: f64,

    /// Relative shift of the deterministic sample points from the box center.
    /// Default: 0.3.
    pub rshift: f64,

    /// Gradient-norm threshold at which a local search is converged. Default: 1e-4.
    pub mu: f64,

    /// Maximum bisection depth of the box tree. Default: 8.
    pub max_depth: usize,

    /// Maximum iterations of one local search. Default: 100.
    pub max_local_iter: usize,

    /// Seed for the randomized sample points.
    pub seed: u64,
}

/// JSON has no infinities: the disabled stop value `-inf` is written as
/// `null`, and `null` reads back as `-inf`.
#[cfg(feature = "serde")]
mod stopval_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(stopval: &f64, s: S) -> Result<S::Ok, S::Error> {
        let v = if *stopval == f64::NEG_INFINITY {
            None
        } else {
            Some(*stopval)
        };
        v.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NEG_INFINITY))
    }
}

impl Default for StogoOptions {
    /// Default options matching NLOPT's `stogo_minimize()` constants.
    fn default() -> Self {
        Self {
            max_eval: 0,
            max_time: 0.0,
            stopval: f64::NEG_INFINITY,
            algorithm: StogoAlgorithm::default(),
            population: 0,
            det_pnts: None,
            eps_cl: 0.1,
            rshift: 0.3,
            mu: 1.0e-4,
            max_depth: 8,
            max_local_iter: 100,
            seed: 0,
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Result
// ──────────────────────────────────────────────────────────────────────────────

/// A feasible point and its objective value.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimizer {
    pub x: Vec<f64>,
    pub fun: f64,
}

/// Result of a StoGO optimization run.
#[derive(Debug, Clone)]
pub struct StogoResult {
    /// Best feasible point observed; `None` when no evaluation landed in the box.
    pub minimum: Option<Minimizer>,

    /// Total number of function evaluations.
    pub nfev: usize,

    /// The return code indicating why optimization stopped.
    pub return_code: StogoReturnCode,

    /// Human-readable message describing the termination reason.
    pub message: String,
}

impl StogoResult {
    pub fn new(minimum: Option<Minimizer>, nfev: usize, return_code: StogoReturnCode) -> Self {
        let message = format!("{}", return_code);
        Self {
            minimum,
            nfev,
            return_code,
            message,
        }
    }

    /// True when a feasible minimizer was found.
    pub fn success(&self) -> bool {
        self.minimum.is_some()
    }

    pub fn x(&self) -> Option<&[f64]> {
        self.minimum.as_ref().map(|m| m.x.as_slice())
    }

    pub fn fun(&self) -> Option<f64> {
        self.minimum.as_ref().map(|m| m.fun)
    }
}

impl fmt::Display for StogoResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StogoResult {{")?;
        writeln!(f, "  success: {}", self.success())?;
        writeln!(f, "  message: {}", self.message)?;
        match &self.minimum {
            Some(m) => {
                writeln!(f, "  fun: {:.15e}", m.fun)?;
                write!(f, "  x: [")?;
                for (i, xi) in m.x.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:.15e}", xi)?;
                }
                writeln!(f, "]")?;
            }
            None => writeln!(f, "  minimum: none")?,
        }
        writeln!(f, "  nfev: {}", self.nfev)?;
        writeln!(f, "  return_code: {:?}", self.return_code)?;
        write!(f, "}}")
    }
}

impl fmt::Display for StogoReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure => write!(f, "No feasible minimizer found"),
            Self::InvalidArgs => write!(f, "Invalid arguments"),
            Self::ForcedStop => write!(f, "Optimization forced to stop"),
            Self::Success => write!(f, "Search space exhausted"),
            Self::StopvalReached => write!(f, "Stop value reached"),
            Self::MaxEvalReached => write!(f, "Maximum function evaluations reached"),
            Self::MaxTimeReached => write!(f, "Maximum time exceeded"),
        }
    }
}
