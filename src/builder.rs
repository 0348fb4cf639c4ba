//! Validated, owned-result API on top of the orchestrator.
//!
//! The core [`crate::minimize`] layer trusts its inputs. `StogoBuilder` checks
//! what NLOPT checks before dispatching to StoGO (a non-empty, finite box with
//! `lower <= upper`) and packages the outcome as a [`StogoResult`].

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::engine::{GlobalParams, Stogo};
use crate::error::{Result, StogoError, StogoReturnCode};
use crate::minimize::minimize_with_tracer;
use crate::stopping::StoppingCriteria;
use crate::trace::TraceWriter;
use crate::types::{Bounds, Minimizer, ObjectiveFn, StogoAlgorithm, StogoOptions, StogoResult};

/// Builder for a StoGO run over a closure objective.
///
/// ```no_run
/// use stogo_nlopt::StogoBuilder;
///
/// let result = StogoBuilder::new(
///     |x: &[f64], grad: Option<&mut [f64]>| {
///         if let Some(g) = grad {
///             g[0] = 2.0 * (x[0] - 3.0);
///         }
///         (x[0] - 3.0).powi(2)
///     },
///     vec![(0.0, 10.0)],
/// )
/// .max_eval(500)
/// .minimize()
/// .unwrap();
/// assert!(result.success());
/// ```
pub struct StogoBuilder {
    func: Arc<ObjectiveFn>,
    bounds: Bounds,
    options: StogoOptions,
    force_stop: Option<StoppingCriteria>,
    tracer: Option<Arc<TraceWriter>>,
}

impl StogoBuilder {
    pub fn new(
        func: impl Fn(&[f64], Option<&mut [f64]>) -> f64 + Send + Sync + 'static,
        bounds: Bounds,
    ) -> Self {
        Self {
            func: Arc::new(func),
            bounds,
            options: StogoOptions::default(),
            force_stop: None,
            tracer: None,
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, options: StogoOptions) -> Self {
        self.options = options;
        self
    }

    pub fn max_eval(mut self, max_eval: usize) -> Self {
        self.options.max_eval = max_eval;
        self
    }

    pub fn max_time(mut self, seconds: f64) -> Self {
        self.options.max_time = seconds;
        self
    }

    pub fn stopval(mut self, stopval: f64) -> Self {
        self.options.stopval = stopval;
        self
    }

    pub fn algorithm(mut self, algorithm: StogoAlgorithm) -> Self {
        self.options.algorithm = algorithm;
        self
    }

    pub fn population(mut self, population: usize) -> Self {
        self.options.population = population;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.options.seed = seed;
        self
    }

    /// Share a stopping handle so another thread can call
    /// [`StoppingCriteria::force`] on it.
    pub fn with_force_stop(mut self, handle: &StoppingCriteria) -> Self {
        self.force_stop = Some(handle.clone());
        self
    }

    /// Attach a trace writer shared by the adapter and the engine (only
    /// written to with the `trace` feature).
    pub fn with_tracer(mut self, tracer: Arc<TraceWriter>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Check bounds the way NLOPT does before running StoGO.
    pub fn validate(&self) -> Result<()> {
        if self.bounds.is_empty() {
            return Err(StogoError::InvalidArgs("dimension must be >= 1".into()));
        }
        for (i, &(lo, hi)) in self.bounds.iter().enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(StogoError::InfiniteBounds { dim: i });
            }
            if lo > hi {
                return Err(StogoError::InvalidBounds { dim: i });
            }
        }
        Ok(())
    }

    /// Run one search with the configured seed.
    pub fn minimize(&self) -> Result<StogoResult> {
        self.validate()?;
        Ok(self.run(self.options.seed))
    }

    /// Run independent searches, one per seed, in parallel.
    ///
    /// Each run has its own box and objective adapter; only the objective
    /// closure (and a shared force-stop handle, if any) is shared.
    pub fn minimize_multistart(&self, seeds: &[u64]) -> Result<Vec<StogoResult>> {
        self.validate()?;
        Ok(seeds.par_iter().map(|&seed| self.run(seed)).collect())
    }

    fn run(&self, seed: u64) -> StogoResult {
        let n = self.bounds.len();
        let lower: Vec<f64> = self.bounds.iter().map(|&(lo, _)| lo).collect();
        let upper: Vec<f64> = self.bounds.iter().map(|&(_, hi)| hi).collect();

        let mut params = GlobalParams::from_options(n, &self.options);
        params.seed = seed;
        if let Some(handle) = &self.force_stop {
            params.stop.force_stop = handle.force_stop.clone();
        }

        let mut engine = Stogo::new();
        if let Some(tw) = &self.tracer {
            engine = engine.with_tracer(tw.clone());
        }

        let func = Arc::clone(&self.func);
        let callback = move |x: &[f64], grad: Option<&mut [f64]>| func(x, grad);
        let mut x = vec![0.0; n];
        let mut minf = f64::INFINITY;
        let outcome = minimize_with_tracer(
            &mut engine,
            &params,
            callback,
            &lower,
            &upper,
            &mut x,
            &mut minf,
            self.tracer.clone(),
        );

        debug!(
            algorithm = %self.options.algorithm,
            seed,
            found = outcome.found,
            nfev = outcome.nfev,
            status = ?outcome.status,
            "stogo run finished"
        );

        if outcome.found {
            StogoResult::new(
                Some(Minimizer { x, fun: minf }),
                outcome.nfev,
                outcome.status.return_code(),
            )
        } else {
            StogoResult::new(None, outcome.nfev, StogoReturnCode::Failure)
        }
    }
}
