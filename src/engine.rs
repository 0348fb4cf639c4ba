//! Search engine contract and the StoGO-style box search.
//!
//! The orchestrator hands an engine the caller's box, a [`GlobalParams`]
//! record and an [`Objective`]; the engine calls back into the objective
//! synchronously until its stopping criteria fire or it runs out of boxes.
//!
//! # StoGO Correspondence
//!
//! | Rust                          | StoGO (C++)                     |
//! |-------------------------------|---------------------------------|
//! | `GlobalParams`                | `GlobalParams`                  |
//! | `Stogo::search()`             | `Global::Search()`              |
//! | `Stogo::process_box()`        | `Global::FillRegular()` + `Global::FillRandom()` + local searches |
//! | `Stogo::minimizers()`         | `Global::GetMinimizers()`       |
//! | `Stogo::one_minimizer()`      | `Global::OneMinimizer()`        |

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::domain::BoxDomain;
use crate::local::{local_search, LocalParams, LocalStatus};
use crate::objective::Objective;
use crate::stopping::{SearchStatus, StoppingCriteria};
use crate::trace::TraceWriter;
use crate::trace_write;
use crate::types::{EvalMode, Minimizer, StogoOptions};

// ──────────────────────────────────────────────────────────────────────────────
// Parameters
// ──────────────────────────────────────────────────────────────────────────────

/// Engine configuration, matching StoGO's `GlobalParams` record.
///
/// The sampling and clustering constants are opaque to the adapter layer and
/// passed through unchanged.
#[derive(Debug, Clone)]
pub struct GlobalParams {
    /// Randomized sample points per box (`rnd_pnts`).
    pub rnd_pnts: usize,
    /// Deterministic sample points per box (`det_pnts`).
    pub det_pnts: usize,
    /// Relative clustering distance (`eps_cl`).
    pub eps_cl: f64,
    /// Relative sample shift and initial local-search radius (`rshift`).
    pub rshift: f64,
    /// Local-minimization gradient threshold (`mu`).
    pub mu: f64,
    /// Maximum bisection depth of the box tree.
    pub max_depth: usize,
    /// Maximum iterations of one local search.
    pub max_local_iter: usize,
    /// Seed for the randomized sample points.
    pub seed: u64,
    pub stop: StoppingCriteria,
}

impl GlobalParams {
    /// Parameters as set up by NLOPT's `stogo_minimize()`:
    /// `rnd_pnts = nrandom`, `det_pnts = 2n + 1 - nrandom`, `eps_cl = 0.1`,
    /// `rshift = 0.3`, `mu = 1e-4`.
    ///
    /// `det_pnts` saturates at zero when `nrandom > 2n + 1`.
    pub fn new(n: usize, nrandom: usize, stop: StoppingCriteria) -> Self {
        let defaults = StogoOptions::default();
        Self {
            rnd_pnts: nrandom,
            det_pnts: default_det_pnts(n, nrandom),
            eps_cl: defaults.eps_cl,
            rshift: defaults.rshift,
            mu: defaults.mu,
            max_depth: defaults.max_depth,
            max_local_iter: defaults.max_local_iter,
            seed: defaults.seed,
            stop,
        }
    }

    /// Parameters from high-level options for an `n`-dimensional problem.
    pub fn from_options(n: usize, options: &StogoOptions) -> Self {
        let nrandom = options.algorithm.nrandom(n, options.population);
        Self {
            rnd_pnts: nrandom,
            det_pnts: options
                .det_pnts
                .unwrap_or_else(|| default_det_pnts(n, nrandom)),
            eps_cl: options.eps_cl,
            rshift: options.rshift,
            mu: options.mu,
            max_depth: options.max_depth,
            max_local_iter: options.max_local_iter,
            seed: options.seed,
            stop: StoppingCriteria {
                max_eval: options.max_eval,
                max_time: options.max_time,
                stopval: options.stopval,
                ..Default::default()
            },
        }
    }
}

/// StoGO's `2n + 1 - nrandom` split, saturating at zero.
pub fn default_det_pnts(n: usize, nrandom: usize) -> usize {
    (2 * n + 1).saturating_sub(nrandom)
}

// ──────────────────────────────────────────────────────────────────────────────
// Engine contract
// ──────────────────────────────────────────────────────────────────────────────

/// A box-constrained global search that evaluates through an [`Objective`].
///
/// The call is synchronous: it returns only once the engine's own stopping
/// criteria fire. Implementations may evaluate points outside `domain`.
pub trait SearchEngine {
    fn search(
        &mut self,
        domain: &BoxDomain,
        params: &GlobalParams,
        objective: &mut dyn Objective,
    ) -> SearchStatus;
}

// ──────────────────────────────────────────────────────────────────────────────
// Box queue
// ──────────────────────────────────────────────────────────────────────────────

/// A box awaiting processing, ordered so the lowest `fmin` pops first
/// (insertion order breaks ties).
struct QueuedBox {
    fmin: f64,
    order: usize,
    depth: usize,
    region: BoxDomain,
}

impl PartialEq for QueuedBox {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedBox {}

impl PartialOrd for QueuedBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedBox {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse both keys.
        other
            .fmin
            .total_cmp(&self.fmin)
            .then_with(|| other.order.cmp(&self.order))
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Stogo engine
// ──────────────────────────────────────────────────────────────────────────────

/// StoGO-style branch-and-sample search.
///
/// Boxes are taken best-first. Each box is sampled, local searches are started
/// from samples not already close to a known minimizer, and the box is then
/// bisected along its longest side. Only converged local searches contribute
/// to the engine's minimizer list; every other evaluation is visible solely
/// to the objective.
#[derive(Default)]
pub struct Stogo {
    minimizers: Vec<Minimizer>,
    boxes_processed: usize,
    #[cfg_attr(not(feature = "trace"), allow(dead_code))]
    tracer: Option<Arc<TraceWriter>>,
}

impl Stogo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a trace writer (only written to with the `trace` feature).
    pub fn with_tracer(mut self, tracer: Arc<TraceWriter>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Local minimizers found by converged local searches in the last run.
    pub fn minimizers(&self) -> &[Minimizer] {
        &self.minimizers
    }

    /// Lowest of the engine's own minimizers.
    pub fn one_minimizer(&self) -> Option<&Minimizer> {
        self.minimizers
            .iter()
            .min_by(|a, b| a.fun.total_cmp(&b.fun))
    }

    pub fn boxes_processed(&self) -> usize {
        self.boxes_processed
    }

    /// Sample one box, run local searches from its samples, and return the
    /// samples as `(point, value)` pairs. `Err` carries the stopping reason.
    #[allow(clippy::too_many_arguments)]
    fn process_box(
        &mut self,
        domain: &BoxDomain,
        region: &BoxDomain,
        params: &GlobalParams,
        objective: &mut dyn Objective,
        rng: &mut StdRng,
        start: Instant,
    ) -> Result<Vec<(Vec<f64>, f64)>, SearchStatus> {
        let stop = &params.stop;
        let mut points = deterministic_points(region, params.det_pnts, params.rshift);
        points.extend(random_points(region, params.rnd_pnts, rng));

        let mut samples = Vec::with_capacity(points.len());
        let mut unused_grad = vec![0.0; region.dim()];
        for x in points {
            if let Some(s) = stop.check(objective.evaluations(), start) {
                return Err(s);
            }
            let f = objective.objective_gradient(&x, &mut unused_grad, EvalMode::ObjectiveOnly);
            if stop.stopval_reached(f) {
                return Err(SearchStatus::StopvalReached);
            }
            samples.push((x, f));
        }

        if region.max_width() <= 0.0 {
            return Ok(samples);
        }

        let mut starts: Vec<usize> = (0..samples.len()).collect();
        starts.sort_by(|&a, &b| samples[a].1.total_cmp(&samples[b].1));

        let local = LocalParams {
            mu: params.mu,
            radius: params.rshift * region.max_width(),
            max_iter: params.max_local_iter,
        };
        let mut found = Vec::new();
        for idx in starts {
            let (x0, f0) = &samples[idx];
            if !f0.is_finite() || self.near_known_minimizer(domain, x0, params.eps_cl) {
                continue;
            }
            let out = local_search(objective, region, x0, *f0, &local, stop, start);
            trace!(status = %out.status, f = out.f, iters = out.iterations, "local search");
            trace_write!(
                self.tracer,
                "TRACE LOCAL status={} f={:.17e} iters={}",
                out.status,
                out.f,
                out.iterations
            );
            match out.status {
                LocalStatus::Converged => {
                    if !self.near_known_minimizer(domain, &out.x, params.eps_cl) {
                        self.minimizers.push(Minimizer {
                            x: out.x.clone(),
                            fun: out.f,
                        });
                    }
                    found.push((out.x, out.f));
                }
                LocalStatus::Stopped(s) => return Err(s),
                LocalStatus::LeftBox | LocalStatus::Stalled | LocalStatus::MaxIter => {
                    found.push((out.x, out.f));
                }
            }
        }
        samples.extend(found);
        Ok(samples)
    }

    fn near_known_minimizer(&self, domain: &BoxDomain, x: &[f64], eps_cl: f64) -> bool {
        self.minimizers
            .iter()
            .any(|m| domain.scaled_distance(&m.x, x) < eps_cl)
    }
}

impl SearchEngine for Stogo {
    fn search(
        &mut self,
        domain: &BoxDomain,
        params: &GlobalParams,
        objective: &mut dyn Objective,
    ) -> SearchStatus {
        let start = Instant::now();
        self.minimizers.clear();
        self.boxes_processed = 0;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut order = 0;
        let mut queue = BinaryHeap::new();
        queue.push(QueuedBox {
            fmin: f64::INFINITY,
            order,
            depth: 0,
            region: domain.clone(),
        });

        while let Some(b) = queue.pop() {
            if let Some(s) = params.stop.check(objective.evaluations(), start) {
                return s;
            }

            let samples =
                match self.process_box(domain, &b.region, params, objective, &mut rng, start) {
                    Ok(samples) => samples,
                    Err(s) => {
                        debug!(status = ?s, nfev = objective.evaluations(), "search stopped");
                        return s;
                    }
                };
            self.boxes_processed += 1;

            let fmin = samples
                .iter()
                .map(|(_, f)| *f)
                .fold(f64::INFINITY, f64::min);
            debug!(
                depth = b.depth,
                fmin,
                width = b.region.max_width(),
                nfev = objective.evaluations(),
                "box processed"
            );
            trace_write!(
                self.tracer,
                "TRACE BOX depth={} fmin={:.17e} width={:.17e}",
                b.depth,
                fmin,
                b.region.max_width()
            );

            if b.depth >= params.max_depth || b.region.max_width() <= 0.0 {
                continue;
            }
            let (left, right) = b.region.bisect(b.region.longest_side());
            for child in [left, right] {
                let child_fmin = samples
                    .iter()
                    .filter(|(x, _)| child.contains(x))
                    .map(|(_, f)| *f)
                    .fold(f64::INFINITY, f64::min);
                order += 1;
                queue.push(QueuedBox {
                    fmin: if child_fmin.is_finite() { child_fmin } else { fmin },
                    order,
                    depth: b.depth + 1,
                    region: child,
                });
            }
        }
        SearchStatus::Exhausted
    }
}

/// The box center followed by points shifted `±rshift` half-widths along
/// successive axes (StoGO's `FillRegular`). Past `2n + 1` points the cycle
/// repeats with the shift divided by the cycle number.
fn deterministic_points(region: &BoxDomain, count: usize, rshift: f64) -> Vec<Vec<f64>> {
    let n = region.dim();
    let center = region.center();
    let mut points = Vec::with_capacity(count);
    if count == 0 {
        return points;
    }
    points.push(center.clone());
    if n == 0 {
        return points;
    }
    for k in 0..count - 1 {
        let axis = (k / 2) % n;
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        let cycle = (k / (2 * n)) as f64;
        let shift = rshift / (1.0 + cycle);
        let mut x = center.clone();
        let half = 0.5 * region.width(axis);
        x[axis] = (center[axis] + sign * shift * half)
            .max(region.lower()[axis])
            .min(region.upper()[axis]);
        points.push(x);
    }
    points
}

/// Uniform random points inside `region` (StoGO's `FillRandom`).
fn random_points(region: &BoxDomain, count: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    (0..count)
        .map(|_| {
            (0..region.dim())
                .map(|i| region.lower()[i] + rng.random::<f64>() * region.width(i))
                .collect()
        })
        .collect()
}
