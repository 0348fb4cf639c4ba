//! C FFI bindings for the STOGO-NLOPT library.
//!
//! Provides C-compatible function signatures matching NLOPT's `stogo.h`,
//! enabling external C/C++ programs to call the Rust StoGO front-end.
//!
//! # NLOPT C Correspondence
//!
//! | C function (NLOPT)       | Rust FFI function            |
//! |--------------------------|------------------------------|
//! | `stogo_minimize()`       | `stogo_minimize()`           |
//!
//! The callback keeps NLOPT's `objective_func` shape verbatim: a function
//! pointer plus an opaque `void *data` handed back unchanged on every call.

use std::os::raw::{c_char, c_double, c_int, c_long, c_uint, c_void};
use std::ptr;
use std::slice;

use crate::engine::{GlobalParams, Stogo};
use crate::error::StogoReturnCode;
use crate::minimize::{self, minimize_with};
use crate::objective::Callback;
use crate::stopping::StoppingCriteria;

// ──────────────────────────────────────────────────────────────────────────────
// C-compatible types
// ──────────────────────────────────────────────────────────────────────────────

/// C-compatible objective function pointer, matching NLOPT's `objective_func`.
///
/// ```c
/// typedef double (*objective_func)(unsigned n, const double *x,
///                                  double *gradient, void *func_data);
/// ```
///
/// `gradient` is NULL when only the objective value is wanted.
pub type ObjectiveFuncC = unsafe extern "C" fn(
    n: c_uint,
    x: *const c_double,
    gradient: *mut c_double,
    func_data: *mut c_void,
) -> c_double;

/// The (function pointer, opaque context) pair as a [`Callback`].
#[derive(Debug, Clone, Copy)]
pub struct CCallback {
    func: ObjectiveFuncC,
    data: *mut c_void,
}

impl CCallback {
    /// # Safety
    ///
    /// `func` must be safe to call with any `n`-length `x`, a NULL or
    /// `n`-length writable `gradient`, and `data`, for as long as this value
    /// is used.
    pub unsafe fn new(func: ObjectiveFuncC, data: *mut c_void) -> Self {
        Self { func, data }
    }
}

impl Callback for CCallback {
    fn call(&mut self, x: &[f64], grad: Option<&mut [f64]>) -> f64 {
        let g = grad.map_or(ptr::null_mut(), |g| g.as_mut_ptr());
        // SAFETY: guaranteed by the contract of `CCallback::new`.
        unsafe { (self.func)(x.len() as c_uint, x.as_ptr(), g, self.data) }
    }
}

/// C-compatible result struct for `stogo_minimize_full`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StogoResultC {
    /// 1 if a feasible minimizer was written to `x` / `minf`, else 0
    pub found: c_int,
    /// Return code (matches NLOPT's `nlopt_result` integer values)
    pub return_code: c_int,
    /// Number of function evaluations performed
    pub nfev: c_long,
}

// ──────────────────────────────────────────────────────────────────────────────
// FFI entry points
// ──────────────────────────────────────────────────────────────────────────────

/// Global minimization with NLOPT's `stogo_minimize()` signature
/// (the `maxeval` / `maxtime` variant).
///
/// # Safety
///
/// - `fgrad` must be a valid function pointer.
/// - `l` and `u` must point to arrays of length `n`.
/// - `x` must point to a writable array of length `n`.
/// - `minf` must point to a writable `double`.
/// - `data` is passed through to `fgrad` and must remain valid for the call duration.
///
/// # Returns
///
/// 1 if a feasible minimizer was found and written to `x` / `minf`, 0 otherwise
/// (outputs untouched). `n < 1` returns 0.
#[no_mangle]
pub unsafe extern "C" fn stogo_minimize(
    n: c_int,
    fgrad: ObjectiveFuncC,
    data: *mut c_void,
    x: *mut c_double,
    minf: *mut c_double,
    l: *const c_double,
    u: *const c_double,
    maxeval: c_long,
    maxtime: c_double,
    nrandom: c_int,
) -> c_int {
    if n < 1 {
        return 0;
    }
    let n = n as usize;
    let lb = slice::from_raw_parts(l, n);
    let ub = slice::from_raw_parts(u, n);
    let x_out = slice::from_raw_parts_mut(x, n);
    let stop = StoppingCriteria::from_budget(maxeval as i64, maxtime);
    let callback = CCallback::new(fgrad, data);

    let found = minimize::stogo_minimize(
        n,
        callback,
        x_out,
        &mut *minf,
        lb,
        ub,
        &stop,
        nrandom.max(0) as usize,
    );
    c_int::from(found)
}

/// Extended entry point that also takes a stop value and a seed, and reports
/// the evaluation count and an NLOPT return code.
///
/// A non-finite or `-HUGE_VAL` `stopval` disables the stop-value test.
///
/// # Safety
///
/// Same safety requirements as `stogo_minimize`.
#[no_mangle]
pub unsafe extern "C" fn stogo_minimize_full(
    n: c_int,
    fgrad: ObjectiveFuncC,
    data: *mut c_void,
    x: *mut c_double,
    minf: *mut c_double,
    l: *const c_double,
    u: *const c_double,
    maxeval: c_long,
    maxtime: c_double,
    stopval: c_double,
    nrandom: c_int,
    seed: u64,
) -> StogoResultC {
    if n < 1 {
        return StogoResultC {
            found: 0,
            return_code: StogoReturnCode::InvalidArgs as c_int,
            nfev: 0,
        };
    }
    let n = n as usize;
    let lb = slice::from_raw_parts(l, n);
    let ub = slice::from_raw_parts(u, n);
    let x_out = slice::from_raw_parts_mut(x, n);

    let mut stop = StoppingCriteria::from_budget(maxeval as i64, maxtime);
    if stopval.is_finite() {
        stop.stopval = stopval;
    }
    let mut params = GlobalParams::new(n, nrandom.max(0) as usize, stop);
    params.seed = seed;

    let outcome = minimize_with(
        &mut Stogo::new(),
        &params,
        CCallback::new(fgrad, data),
        lb,
        ub,
        x_out,
        &mut *minf,
    );

    let return_code = if outcome.found {
        outcome.status.return_code()
    } else {
        StogoReturnCode::Failure
    };
    StogoResultC {
        found: c_int::from(outcome.found),
        return_code: return_code as c_int,
        nfev: outcome.nfev as c_long,
    }
}

/// Get the version string of the stogo-nlopt library.
///
/// Returns a pointer to a null-terminated static string.
/// The caller must NOT free the returned pointer.
#[no_mangle]
pub extern "C" fn stogo_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}
