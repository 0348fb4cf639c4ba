//! Orchestration of one StoGO run.
//!
//! Builds the box and the engine parameters, lends a fresh
//! [`FeasibleObjective`] to the engine, and after the engine returns reads the
//! result from the adapter's best-point record rather than from the engine.
//!
//! "No minimizer" is an ordinary outcome here: the return flag is `false` and
//! the caller's buffers are left untouched.

use std::sync::Arc;

use crate::domain::BoxDomain;
use crate::engine::{GlobalParams, SearchEngine, Stogo};
use crate::objective::{Callback, FeasibleObjective, Objective};
use crate::stopping::{SearchStatus, StoppingCriteria};
use crate::trace::TraceWriter;

/// What one orchestrated run produced besides the output buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// A feasible point was written to the outputs.
    pub found: bool,
    /// Objective evaluations performed by the engine.
    pub nfev: usize,
    /// Why the engine returned.
    pub status: SearchStatus,
}

/// Run `engine` over the box `[lower, upper]` and copy the best feasible point
/// into `x` / `minf`.
///
/// `x` must have the same length as the bounds. Bounds are not validated.
#[allow(clippy::too_many_arguments)]
pub fn minimize_with<E, C>(
    engine: &mut E,
    params: &GlobalParams,
    callback: C,
    lower: &[f64],
    upper: &[f64],
    x: &mut [f64],
    minf: &mut f64,
) -> Outcome
where
    E: SearchEngine + ?Sized,
    C: Callback,
{
    minimize_with_tracer(engine, params, callback, lower, upper, x, minf, None)
}

/// [`minimize_with`] with the adapter's `TRACE EVAL` / `TRACE BEST` lines
/// written to `tracer` (only with the `trace` feature).
#[allow(clippy::too_many_arguments)]
pub fn minimize_with_tracer<E, C>(
    engine: &mut E,
    params: &GlobalParams,
    callback: C,
    lower: &[f64],
    upper: &[f64],
    x: &mut [f64],
    minf: &mut f64,
    tracer: Option<Arc<TraceWriter>>,
) -> Outcome
where
    E: SearchEngine + ?Sized,
    C: Callback,
{
    let domain = BoxDomain::new(lower, upper);
    let mut objective = FeasibleObjective::new(callback, &domain);
    if let Some(tw) = tracer {
        objective = objective.with_tracer(tw);
    }
    let status = engine.search(&domain, params, &mut objective);
    let nfev = objective.evaluations();

    match objective.read_best() {
        Some((fun, best)) => {
            x.copy_from_slice(best);
            *minf = fun;
            Outcome {
                found: true,
                nfev,
                status,
            }
        }
        None => Outcome {
            found: false,
            nfev,
            status,
        },
    }
}

/// StoGO minimization with NLOPT's `stogo_minimize()` contract.
///
/// `nrandom` of the `2n + 1` sample points per box are randomized. Returns
/// `true` and fills `x` / `minf` when a feasible point was evaluated; returns
/// `false` with both untouched otherwise.
#[allow(clippy::too_many_arguments)]
pub fn stogo_minimize<C: Callback>(
    n: usize,
    callback: C,
    x: &mut [f64],
    minf: &mut f64,
    lower: &[f64],
    upper: &[f64],
    stop: &StoppingCriteria,
    nrandom: usize,
) -> bool {
    debug_assert!(x.len() == n && lower.len() == n && upper.len() == n);
    let params = GlobalParams::new(n, nrandom, stop.clone());
    let mut engine = Stogo::new();
    minimize_with(&mut engine, &params, callback, lower, upper, x, minf).found
}
