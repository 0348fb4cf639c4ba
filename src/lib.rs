//! # STOGO-NLOPT: NLOPT's StoGO front-end in Rust
//!
//! A Rust-native implementation of the NLOPT `stogo_minimize()` front-end: a
//! box-constrained global search driven through a flat objective callback,
//! with the result taken from a feasibility-gated best-point record instead of
//! the search engine's own bookkeeping.
//!
//! ## Overview
//!
//! The search engine may evaluate points that never become candidate optima,
//! and some of its local-search probes step outside the caller's box. The
//! [`objective::FeasibleObjective`] adapter sits between the engine and the
//! caller's callback, counts every evaluation, and remembers the lowest value
//! seen at a point inside the box. The orchestrator ([`minimize`]) reports
//! that point, or reports that none exists.
//!
//! ## Entry points
//!
//! - **Rust, unchecked**: [`stogo_minimize`] / [`minimize::minimize_with`]
//! - **Rust, validated**: [`StogoBuilder`]
//! - **C ABI**: [`ffi::stogo_minimize`] with NLOPT's `objective_func` callback
//!
//! ## Algorithm Variants
//!
//! - **StoGO**: `StogoAlgorithm::Stogo` (`NLOPT_GD_STOGO`)
//! - **StoGO randomized**: `StogoAlgorithm::StogoRand` (`NLOPT_GD_STOGO_RAND`)
//!
//! ## References
//!
//! - Madsen, K., Zertchaninov, S. & Zilinskas, A. "Global Optimization using
//!   Branch-and-Bound." (1998).
//! - NLOPT: <https://github.com/stevengj/nlopt>

pub mod builder;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod local;
pub mod minimize;
pub mod objective;
pub mod stopping;
pub mod trace;
pub mod types;

// Re-export main types
pub use builder::StogoBuilder;
pub use domain::BoxDomain;
pub use engine::{GlobalParams, SearchEngine, Stogo};
pub use error::{Result, StogoError, StogoReturnCode};
pub use minimize::{minimize_with, minimize_with_tracer, stogo_minimize, Outcome};
pub use objective::{BestPoint, Callback, FeasibleObjective, Objective};
pub use stopping::{SearchStatus, StoppingCriteria};
pub use types::{
    Bounds, EvalMode, Minimizer, ObjectiveFn, StogoAlgorithm, StogoOptions, StogoResult,
};
