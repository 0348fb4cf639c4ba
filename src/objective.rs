//! Objective adapter with a feasibility-gated best-point record.
//!
//! The search engine sees only the [`Objective`] capability. Every call it
//! makes is forwarded to the caller's [`Callback`], and as a side effect the
//! adapter remembers the lowest value observed at a point inside the caller's
//! box. That record, not the engine's own list of minimizers, is what the
//! orchestrator reports: the engine's local searches evaluate points that
//! never become candidates, and some of its probes leave the box.

use std::sync::Arc;

use crate::domain::BoxDomain;
use crate::trace::TraceWriter;
use crate::trace_write;
use crate::types::EvalMode;

/// Caller-supplied objective.
///
/// Implemented for closures `FnMut(&[f64], Option<&mut [f64]>) -> f64` and for
/// the C function-pointer form in [`crate::ffi::CCallback`].
pub trait Callback {
    /// Evaluate at `x`; when `grad` is `Some`, also write the gradient into it.
    fn call(&mut self, x: &[f64], grad: Option<&mut [f64]>) -> f64;
}

impl<F> Callback for F
where
    F: FnMut(&[f64], Option<&mut [f64]>) -> f64,
{
    fn call(&mut self, x: &[f64], grad: Option<&mut [f64]>) -> f64 {
        self(x, grad)
    }
}

/// Evaluation capability the search engine drives.
///
/// Matches StoGO's virtual `Global::ObjectiveGradient()` plus its `numeval` counter.
pub trait Objective {
    /// Evaluate at `x`. `grad` must have length `x.len()` whenever
    /// `which.needs_gradient()`; it is left untouched otherwise.
    fn objective_gradient(&mut self, x: &[f64], grad: &mut [f64], which: EvalMode) -> f64;

    /// Number of evaluations performed so far.
    fn evaluations(&self) -> usize;
}

/// Running minimum over feasible evaluations.
///
/// Starts at `+inf`; replaced only by a strictly lower value, so the first
/// point to reach a given value keeps it.
#[derive(Debug, Clone)]
pub struct BestPoint {
    fun: f64,
    x: Vec<f64>,
}

impl BestPoint {
    pub fn new(n: usize) -> Self {
        Self {
            fun: f64::INFINITY,
            x: vec![0.0; n],
        }
    }

    /// True once a feasible evaluation improved on the initial `+inf`.
    pub fn has_result(&self) -> bool {
        self.fun < f64::INFINITY
    }

    /// The recorded `(value, point)`, or `None` before any feasible improvement.
    pub fn read_best(&self) -> Option<(f64, &[f64])> {
        if self.has_result() {
            Some((self.fun, &self.x))
        } else {
            None
        }
    }

    /// Record `(fun, x)` when strictly better. Returns whether it was recorded.
    fn offer(&mut self, fun: f64, x: &[f64]) -> bool {
        // NaN compares false and never replaces the record.
        if fun < self.fun {
            self.fun = fun;
            self.x.copy_from_slice(x);
            true
        } else {
            false
        }
    }
}

/// Adapter from a [`Callback`] to the engine's [`Objective`].
///
/// Owns the best-point record for exactly one run; the domain is borrowed from
/// the orchestrator.
pub struct FeasibleObjective<'d, C> {
    callback: C,
    domain: &'d BoxDomain,
    numeval: usize,
    best: BestPoint,
    #[cfg_attr(not(feature = "trace"), allow(dead_code))]
    tracer: Option<Arc<TraceWriter>>,
}

impl<'d, C: Callback> FeasibleObjective<'d, C> {
    pub fn new(callback: C, domain: &'d BoxDomain) -> Self {
        Self {
            callback,
            domain,
            numeval: 0,
            best: BestPoint::new(domain.dim()),
            tracer: None,
        }
    }

    /// Attach a trace writer (only written to with the `trace` feature).
    pub fn with_tracer(mut self, tracer: Arc<TraceWriter>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn has_result(&self) -> bool {
        self.best.has_result()
    }

    pub fn read_best(&self) -> Option<(f64, &[f64])> {
        self.best.read_best()
    }
}

impl<C: Callback> Objective for FeasibleObjective<'_, C> {
    fn objective_gradient(&mut self, x: &[f64], grad: &mut [f64], which: EvalMode) -> f64 {
        self.numeval += 1;

        let val = if which.needs_gradient() {
            debug_assert_eq!(grad.len(), x.len());
            self.callback.call(x, Some(grad))
        } else {
            self.callback.call(x, None)
        };

        let inside = self.domain.contains(x);
        trace_write!(
            self.tracer,
            "TRACE EVAL n={} mode={} f={:.17e} inside={}",
            self.numeval,
            which,
            val,
            inside
        );

        if inside && self.best.offer(val, x) {
            trace_write!(self.tracer, "TRACE BEST n={} f={:.17e}", self.numeval, val);
        }
        val
    }

    fn evaluations(&self) -> usize {
        self.numeval
    }
}
