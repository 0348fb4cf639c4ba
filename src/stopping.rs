//! Stopping criteria honored by the search engine.
//!
//! A trimmed counterpart of NLOPT's `nlopt_stopping`: the StoGO front-end
//! only ever consults the evaluation budget, the time budget, the stop value
//! and the forced-stop flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::StogoReturnCode;

/// Stopping configuration for one search.
#[derive(Debug, Clone)]
pub struct StoppingCriteria {
    /// Maximum number of objective evaluations. 0 means no limit.
    pub max_eval: usize,

    /// Maximum wall-clock time in seconds. 0.0 means no limit.
    pub max_time: f64,

    /// Stop once a feasible value `<= stopval` has been seen.
    /// `f64::NEG_INFINITY` disables the test (NLOPT's `minf_max` default).
    pub stopval: f64,

    /// Force-stop flag: when set to true, the engine stops before its next evaluation.
    pub force_stop: Arc<AtomicBool>,
}

impl Default for StoppingCriteria {
    fn default() -> Self {
        Self {
            max_eval: 0,
            max_time: 0.0,
            stopval: f64::NEG_INFINITY,
            force_stop: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl StoppingCriteria {
    /// The `(maxeval, maxtime)` pair accepted by the plain C entry point.
    /// Non-positive values mean "no limit".
    pub fn from_budget(max_eval: i64, max_time: f64) -> Self {
        Self {
            max_eval: if max_eval > 0 { max_eval as usize } else { 0 },
            max_time: if max_time > 0.0 { max_time } else { 0.0 },
            ..Default::default()
        }
    }

    pub fn evals_reached(&self, nevals: usize) -> bool {
        self.max_eval > 0 && nevals >= self.max_eval
    }

    pub fn time_reached(&self, start: Instant) -> bool {
        self.max_time > 0.0 && start.elapsed().as_secs_f64() >= self.max_time
    }

    pub fn stopval_reached(&self, f: f64) -> bool {
        self.stopval > f64::NEG_INFINITY && f <= self.stopval
    }

    pub fn forced(&self) -> bool {
        self.force_stop.load(Ordering::Relaxed)
    }

    /// Request a stop from another thread or from within the objective.
    pub fn force(&self) {
        self.force_stop.store(true, Ordering::Relaxed);
    }

    /// Which limit, if any, is hit given the evaluation count and start time.
    /// Checked in NLOPT's order: forced stop, evaluations, time.
    pub fn check(&self, nevals: usize, start: Instant) -> Option<SearchStatus> {
        if self.forced() {
            Some(SearchStatus::ForcedStop)
        } else if self.evals_reached(nevals) {
            Some(SearchStatus::MaxEvalReached)
        } else if self.time_reached(start) {
            Some(SearchStatus::MaxTimeReached)
        } else {
            None
        }
    }
}

/// Why the search engine returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    /// Every box was processed down to the configured depth.
    Exhausted,
    MaxEvalReached,
    MaxTimeReached,
    StopvalReached,
    ForcedStop,
}

impl SearchStatus {
    /// NLOPT code reported when the run did produce a minimizer.
    pub fn return_code(&self) -> StogoReturnCode {
        match self {
            Self::Exhausted => StogoReturnCode::Success,
            Self::MaxEvalReached => StogoReturnCode::MaxEvalReached,
            Self::MaxTimeReached => StogoReturnCode::MaxTimeReached,
            Self::StopvalReached => StogoReturnCode::StopvalReached,
            Self::ForcedStop => StogoReturnCode::ForcedStop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_limits() {
        let s = StoppingCriteria::default();
        let start = Instant::now();
        assert!(!s.evals_reached(usize::MAX));
        assert!(!s.stopval_reached(-1e300));
        assert_eq!(s.check(1_000_000, start), None);
    }

    #[test]
    fn test_from_budget_non_positive_means_unlimited() {
        let s = StoppingCriteria::from_budget(-1, -2.0);
        assert_eq!(s.max_eval, 0);
        assert_eq!(s.max_time, 0.0);
        let s = StoppingCriteria::from_budget(50, 1.5);
        assert_eq!(s.max_eval, 50);
        assert_eq!(s.max_time, 1.5);
    }

    #[test]
    fn test_eval_budget() {
        let s = StoppingCriteria::from_budget(10, 0.0);
        let start = Instant::now();
        assert_eq!(s.check(9, start), None);
        assert_eq!(s.check(10, start), Some(SearchStatus::MaxEvalReached));
    }

    #[test]
    fn test_forced_stop_wins() {
        let s = StoppingCriteria::from_budget(10, 0.0);
        let shared = s.clone();
        shared.force();
        assert_eq!(s.check(10, Instant::now()), Some(SearchStatus::ForcedStop));
    }

    #[test]
    fn test_stopval() {
        let s = StoppingCriteria {
            stopval: 0.5,
            ..Default::default()
        };
        assert!(s.stopval_reached(0.5));
        assert!(!s.stopval_reached(0.51));
    }

    #[test]
    fn test_status_return_codes() {
        assert_eq!(SearchStatus::Exhausted.return_code(), StogoReturnCode::Success);
        assert_eq!(
            SearchStatus::MaxEvalReached.return_code(),
            StogoReturnCode::MaxEvalReached
        );
        assert!(SearchStatus::ForcedStop.return_code().is_error());
    }
}
