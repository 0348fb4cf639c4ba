//! Gradient-based local search used inside one box of the StoGO search.
//!
//! A quasi-Newton (BFGS inverse-Hessian) iteration with a step-length radius,
//! in the spirit of StoGO's `local.cc` trust-region search. The iteration is
//! confined to the current box only by observation: a trial point is always
//! evaluated first, and if it lies outside the box the search ends there.
//! Those out-of-box probes are the evaluations the adapter must keep out of
//! its best-point record.

use std::time::Instant;

use ndarray::{aview1, Array1, Array2, ArrayView1, Axis};

use crate::domain::BoxDomain;
use crate::objective::Objective;
use crate::stopping::{SearchStatus, StoppingCriteria};
use crate::types::EvalMode;

/// Armijo sufficient-decrease constant.
const ARMIJO_C1: f64 = 1.0e-4;

/// Radius shrink factor after a rejected step.
const SHRINK: f64 = 0.25;

/// How a local search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalStatus {
    /// Gradient norm fell below `mu`.
    Converged,
    /// A trial step left the box.
    LeftBox,
    /// The step radius collapsed without sufficient decrease.
    Stalled,
    /// Iteration limit reached.
    MaxIter,
    /// A stopping criterion fired; the whole search must end.
    Stopped(SearchStatus),
}

impl std::fmt::Display for LocalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::LeftBox => write!(f, "left_box"),
            Self::Stalled => write!(f, "stalled"),
            Self::MaxIter => write!(f, "max_iter"),
            Self::Stopped(s) => write!(f, "stopped({:?})", s),
        }
    }
}

/// Final iterate of a local search. `x`/`f` are the last accepted point, which
/// is always inside the box.
#[derive(Debug, Clone)]
pub struct LocalOutcome {
    pub x: Vec<f64>,
    pub f: f64,
    pub status: LocalStatus,
    pub iterations: usize,
}

/// Per-search settings.
#[derive(Debug, Clone, Copy)]
pub struct LocalParams {
    /// Gradient-norm convergence threshold.
    pub mu: f64,
    /// Initial step radius.
    pub radius: f64,
    pub max_iter: usize,
}

/// Run a local search from `x0` (with known value `f0`) inside `region`.
pub fn local_search(
    objective: &mut dyn Objective,
    region: &BoxDomain,
    x0: &[f64],
    f0: f64,
    params: &LocalParams,
    stop: &StoppingCriteria,
    start: Instant,
) -> LocalOutcome {
    let n = x0.len();
    let mut x = x0.to_vec();
    let mut f = f0;
    let mut g = vec![0.0; n];

    let finish = |x: Vec<f64>, f: f64, status: LocalStatus, iterations: usize| LocalOutcome {
        x,
        f,
        status,
        iterations,
    };

    if let Some(s) = stop.check(objective.evaluations(), start) {
        return finish(x, f, LocalStatus::Stopped(s), 0);
    }
    objective.objective_gradient(&x, &mut g, EvalMode::GradientOnly);

    // Inverse-Hessian approximation.
    let mut h = Array2::<f64>::eye(n);
    let mut radius = params.radius;
    let mut gt = vec![0.0; n];
    let mut xt = vec![0.0; n];

    for iter in 0..params.max_iter {
        if norm(aview1(&g)) < params.mu {
            return finish(x, f, LocalStatus::Converged, iter);
        }

        let mut d: Array1<f64> = -h.dot(&aview1(&g));
        if d.dot(&aview1(&g)) >= 0.0 {
            // Lost positive definiteness: fall back to steepest descent.
            h = Array2::eye(n);
            d = -&aview1(&g);
        }
        let dn = norm(d.view());
        if dn > radius {
            d *= radius / dn;
        }
        for ((xt_i, &x_i), &d_i) in xt.iter_mut().zip(&x).zip(d.iter()) {
            *xt_i = x_i + d_i;
        }

        if let Some(s) = stop.check(objective.evaluations(), start) {
            return finish(x, f, LocalStatus::Stopped(s), iter);
        }
        let ft = objective.objective_gradient(&xt, &mut gt, EvalMode::ObjectiveAndGradient);

        if !region.contains(&xt) {
            return finish(x, f, LocalStatus::LeftBox, iter + 1);
        }

        let gd = d.dot(&aview1(&g));
        if ft.is_finite() && ft <= f + ARMIJO_C1 * gd {
            let y = &aview1(&gt) - &aview1(&g);
            bfgs_update(&mut h, d.view(), y.view());
            let step = norm(d.view());
            x.copy_from_slice(&xt);
            f = ft;
            g.copy_from_slice(&gt);
            if stop.stopval_reached(f) {
                return finish(x, f, LocalStatus::Stopped(SearchStatus::StopvalReached), iter + 1);
            }
            radius = radius.max(2.0 * step);
        } else {
            radius = SHRINK * norm(d.view());
            if radius <= f64::EPSILON * (1.0 + norm(aview1(&x))) {
                return finish(x, f, LocalStatus::Stalled, iter + 1);
            }
        }
    }
    finish(x, f, LocalStatus::MaxIter, params.max_iter)
}

fn norm(v: ArrayView1<'_, f64>) -> f64 {
    v.dot(&v).sqrt()
}

/// Inverse-Hessian BFGS update, skipped when the curvature condition fails.
///
/// `H+ = H - rho (Hy sᵀ + s (Hy)ᵀ) + (rho² yᵀHy + rho) s sᵀ` with `rho = 1 / sᵀy`.
fn bfgs_update(h: &mut Array2<f64>, s: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) {
    let sy = s.dot(&y);
    if sy <= 1.0e-12 * norm(s) * norm(y) {
        return;
    }
    let rho = 1.0 / sy;
    let hy = h.dot(&y);
    let yhy = y.dot(&hy);

    let s_col = s.insert_axis(Axis(1));
    let s_row = s.insert_axis(Axis(0));
    let hy_col = hy.view().insert_axis(Axis(1));
    let hy_row = hy.view().insert_axis(Axis(0));

    h.scaled_add(-rho, &hy_col.dot(&s_row));
    h.scaled_add(-rho, &s_col.dot(&hy_row));
    h.scaled_add(rho * rho * yhy + rho, &s_col.dot(&s_row));
}
