//! Process-wide solver configuration.
//!
//! Two knobs control [`normalised_implied_black_volatility`]: the maximum
//! number of Householder iterations and the highest convergence order of
//! the update step. Both live in atomics. They are meant to be set once at
//! startup, but may be changed at any time: each solver call reads each knob
//! exactly once, so it sees a consistent pair of values.
//!
//! ```
//! use rationalvol::config::{self, SolverSettings};
//!
//! let previous = SolverSettings::current();
//! let effective = SolverSettings::default().with_max_iterations(4).apply();
//! assert_eq!(effective.max_iterations, 4);
//! assert_eq!(config::max_iterations(), 4);
//! previous.apply();
//! ```
//!
//! [`normalised_implied_black_volatility`]: crate::black::normalised_implied_black_volatility

use std::sync::atomic::{AtomicI32, Ordering};

use serde::{Deserialize, Serialize};

/// Householder iterations performed after the initial guess.
pub const DEFAULT_MAX_ITERATIONS: i32 = 2;

/// Highest convergence order of the update step.
///
/// With 5, the lowest and highest branches switch to Householder(4) at
/// extreme moneyness and everything else uses Householder(3).
pub const DEFAULT_HOUSEHOLDER_ORDER: i32 = 5;

static MAX_ITERATIONS: AtomicI32 = AtomicI32::new(DEFAULT_MAX_ITERATIONS);
static HOUSEHOLDER_ORDER: AtomicI32 = AtomicI32::new(DEFAULT_HOUSEHOLDER_ORDER);

/// Current iteration budget.
#[inline]
pub fn max_iterations() -> i32 {
    MAX_ITERATIONS.load(Ordering::Acquire)
}

/// Current Householder order.
#[inline]
pub fn householder_order() -> i32 {
    HOUSEHOLDER_ORDER.load(Ordering::Acquire)
}

/// Set the iteration budget. Negative values are ignored.
///
/// Returns the value in effect after the call.
pub fn set_max_iterations(n: i32) -> i32 {
    store_non_negative(&MAX_ITERATIONS, n, "max_iterations")
}

/// Set the Householder order. Negative values are ignored.
///
/// Returns the value in effect after the call.
pub fn set_householder_order(order: i32) -> i32 {
    store_non_negative(&HOUSEHOLDER_ORDER, order, "householder_order")
}

fn store_non_negative(cell: &AtomicI32, requested: i32, _knob: &'static str) -> i32 {
    if requested >= 0 {
        cell.store(requested, Ordering::Release);
    }
    let effective = cell.load(Ordering::Acquire);
    #[cfg(feature = "logging")]
    tracing::debug!(knob = _knob, requested, effective, "solver knob updated");
    effective
}

/// The update step selected by a Householder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HouseholderMethod {
    /// Quadratic convergence.
    Newton,
    /// Cubic convergence.
    Halley,
    /// Quartic convergence.
    Householder3,
    /// Quintic convergence.
    Householder4,
}

impl HouseholderMethod {
    /// Interpret an order knob: `> 4` is Householder(4), `4` is
    /// Householder(3), `3` is Halley and anything lower is Newton.
    pub fn from_order(order: i32) -> Self {
        match order {
            o if o > 4 => Self::Householder4,
            4 => Self::Householder3,
            3 => Self::Halley,
            _ => Self::Newton,
        }
    }

    /// Convergence order of the method.
    pub fn order(self) -> i32 {
        match self {
            Self::Newton => 2,
            Self::Halley => 3,
            Self::Householder3 => 4,
            Self::Householder4 => 5,
        }
    }
}

/// Snapshot of both solver knobs.
///
/// Serialises as `{"max_iterations": 2, "householder_order": 5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Iteration budget after the initial guess.
    pub max_iterations: u32,
    /// Highest convergence order of the update step.
    pub householder_order: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS as u32,
            householder_order: DEFAULT_HOUSEHOLDER_ORDER as u32,
        }
    }
}

impl SolverSettings {
    /// Read the knobs currently in effect.
    pub fn current() -> Self {
        Self {
            max_iterations: max_iterations().max(0) as u32,
            householder_order: householder_order().max(0) as u32,
        }
    }

    /// Publish both knobs and return the settings now in effect.
    ///
    /// Values beyond `i32::MAX` saturate.
    pub fn apply(self) -> Self {
        set_max_iterations(i32::try_from(self.max_iterations).unwrap_or(i32::MAX));
        set_householder_order(i32::try_from(self.householder_order).unwrap_or(i32::MAX));
        Self::current()
    }

    pub fn with_max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_householder_order(mut self, order: u32) -> Self {
        self.householder_order = order;
        self
    }

    /// Typed view of [`householder_order`](Self::householder_order).
    pub fn householder_method(&self) -> HouseholderMethod {
        HouseholderMethod::from_order(i32::try_from(self.householder_order).unwrap_or(i32::MAX))
    }
}
