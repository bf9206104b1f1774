//! Implied normalised volatility by "Let's Be Rational".
//!
//! Given an out-of-the-money normalised price `β` and `θx ≤ 0`, the price
//! axis is split at `bₗ < b_c < bᵤ` (see [`bounds`](super::bounds)). Each
//! of the four segments gets its own initial guess and objective function:
//!
//! | Branch | Price range | Initial guess | Objective `g(s)` |
//! |---|---|---|---|
//! | lowest | `β < bₗ` | rational cubic on the lower map | `1/ln b(s) − 1/ln β` |
//! | lower middle | `bₗ ≤ β < b_c` | rational cubic on `s(β)` | `b(s) − β` |
//! | upper middle | `b_c ≤ β ≤ bᵤ` | rational cubic on `s(β)` | `b(s) − β` |
//! | highest | `bᵤ < β` | rational cubic on the upper map | `ln(bₘₐₓ−β) − ln(bₘₐₓ−b(s))` |
//!
//! The highest branch only keeps its own objective for `β > bₘₐₓ/2`;
//! otherwise it iterates on `b(s) − β` like the middle branches.
//!
//! Each guess lies within the domain of attraction of the Householder(3)
//! step `s += ν·(1 + ν·h₂/2)/(1 + ν·(h₂ + ν·h₃/6))`, with `ν = −g/g′` and
//! `hₖ = g⁽ᵏ⁾/g′`, so two iterations reach machine accuracy.
//!
//! # References
//! - Jäckel, P. "Let's Be Rational", Wilmott (2015), pp. 40–53.

use super::bounds::{
    bl_over_bmax, bu_over_bmax, inverse_lower_map, inverse_upper_map, lower_map, one_minus_erfcx,
    upper_map,
};
use super::regions::{
    inv_normalised_vega, normalised_black, normalised_vega, scaled_normalised_black_and_ln_vega,
};
use crate::config::{self, HouseholderMethod};
use crate::constants::{
    DBL_EPSILON, DBL_MAX, DBL_MIN, ONE_OVER_SQRT_TWO, SQRT_DBL_MAX, SQRT_PI_OVER_TWO, SQRT_TWO,
    SQRT_TWO_PI, VOLATILITY_ABOVE_MAXIMUM, VOLATILITY_BELOW_INTRINSIC,
};
use crate::rational_cubic::RationalCubic;
use crate::special::SpecialFunctions;

/// Below this `θx` the lowest branch takes a Householder(4) step.
const LOWEST_BRANCH_FOURTH_ORDER_THRESHOLD: f64 = -190.0;
/// Below this `θx` the highest branch takes a Householder(4) step.
const HIGHEST_BRANCH_FOURTH_ORDER_THRESHOLD: f64 = -580.0;

/// `1 − erfc(1/√2)`: the at-the-money price at `s = 2`.
const ATM_RATIONAL_UPPER_LIMIT: f64 = 0.6826894921370859;

/// Which part of the solver produced a volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverBranch {
    /// The price was at or outside the attainable range; no iteration.
    Boundary,
    /// `x = 0`, solved in closed form.
    AtTheMoney,
    /// `β < bₗ`.
    Lowest,
    /// `bₗ ≤ β < b_c`.
    LowerMiddle,
    /// `b_c ≤ β ≤ bᵤ`.
    UpperMiddle,
    /// `bᵤ < β`.
    Highest,
}

/// Result of one implied volatility solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOutcome {
    /// `s = σ√T`, or one of the sentinels.
    pub normalised_volatility: f64,
    /// Householder iterations performed after the initial guess.
    pub iterations: u32,
    pub branch: SolverBranch,
}

impl SolverOutcome {
    fn new(normalised_volatility: f64, iterations: i32, branch: SolverBranch) -> Self {
        Self {
            normalised_volatility,
            iterations: iterations.max(0) as u32,
            branch,
        }
    }
}

/// Knob values for one solve.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IterationLimits {
    pub max_iterations: i32,
    pub method: HouseholderMethod,
}

impl IterationLimits {
    /// Read both process-wide knobs once.
    pub fn from_knobs() -> Self {
        Self {
            max_iterations: config::max_iterations(),
            method: HouseholderMethod::from_order(config::householder_order()),
        }
    }
}

#[inline]
fn householder3_factor(nu: f64, h2: f64, h3: f64, method: HouseholderMethod) -> f64 {
    match method {
        HouseholderMethod::Householder4 | HouseholderMethod::Householder3 => {
            (1.0 + 0.5 * h2 * nu) / (1.0 + nu * (h2 + h3 * nu / 6.0))
        }
        HouseholderMethod::Halley => 1.0 / (1.0 + 0.5 * h2 * nu),
        HouseholderMethod::Newton => 1.0,
    }
}

#[inline]
fn householder4_factor(nu: f64, h2: f64, h3: f64, h4: f64, method: HouseholderMethod) -> f64 {
    match method {
        HouseholderMethod::Householder4 => {
            (1.0 + nu * (h2 + nu * h3 / 6.0))
                / (1.0 + nu * (1.5 * h2 + nu * (h2 * h2 / 4.0 + h3 / 3.0 + nu * h4 / 24.0)))
        }
        _ => householder3_factor(nu, h2, h3, method),
    }
}

/// Bracket `(left, right)` around the root, with the binary-nesting fallback.
///
/// Only active for iteration budgets above 3: with the default budget the
/// iteration is contractive from every initial guess.
struct Bracket {
    left: f64,
    right: f64,
    previous_step: f64,
    direction_reversals: u32,
    enabled: bool,
    branch: SolverBranch,
}

impl Bracket {
    fn new(left: f64, right: f64, limits: IterationLimits, branch: SolverBranch) -> Self {
        Self {
            left,
            right,
            previous_step: 0.0,
            direction_reversals: 0,
            enabled: limits.max_iterations > 3,
            branch,
        }
    }

    fn midpoint(&self) -> f64 {
        0.5 * (self.left + self.right)
    }

    /// Check made before each iteration. After three direction reversals,
    /// or when `s` has left the bracket, `s` is reset to the midpoint.
    /// Returns `true` when the bracket has collapsed and iteration should stop.
    fn intercept(&mut self, s: &mut f64, ds: &mut f64, iterations: i32) -> bool {
        if *ds * self.previous_step < 0.0 {
            self.direction_reversals += 1;
        }
        if self.enabled
            && iterations > 0
            && (self.direction_reversals == 3 || !(*s > self.left && *s < self.right))
        {
            #[cfg(feature = "logging")]
            tracing::debug!(
                branch = ?self.branch,
                iteration = iterations,
                s = *s,
                s_left = self.left,
                s_right = self.right,
                direction_reversals = self.direction_reversals,
                "binary nesting"
            );
            *s = self.midpoint();
            if self.right - self.left <= DBL_EPSILON * *s {
                return true;
            }
            self.direction_reversals = 0;
            *ds = 0.0;
        }
        self.previous_step = *ds;
        false
    }

    /// Narrow the bracket at `s`, where `excess` has the sign of `b(s) − β`.
    fn tighten(&mut self, s: f64, excess: f64) {
        if excess > 0.0 && s < self.right {
            self.right = s;
        } else if excess < 0.0 && s > self.left {
            self.left = s;
        }
    }

    /// Step to the midpoint after `b` or `b′` under- or overflowed.
    fn nest(&self, s: f64, _iterations: i32) -> f64 {
        #[cfg(feature = "logging")]
        tracing::debug!(
            branch = ?self.branch,
            iteration = _iterations,
            s,
            s_left = self.left,
            s_right = self.right,
            "binary nesting after numerical underflow"
        );
        self.midpoint() - s
    }
}

/// `s = 2√2·erfinv(β)` for `x = 0`.
pub(crate) fn implied_volatility_at_the_money<S: SpecialFunctions>(beta: f64) -> f64 {
    if beta <= ATM_RATIONAL_UPPER_LIMIT {
        let r = ATM_RATIONAL_UPPER_LIMIT * ATM_RATIONAL_UPPER_LIMIT - beta * beta;
        return beta
            * ((2.92958954698308816
                + r * (1.4014698674754995E1
                    + r * (2.44918990556468762E1
                        + r * (1.90763928424894996E1
                            + r * (6.43250149461895996
                                + r * (7.52328633671821543E-1 + 1.38781536163865582E-2 * r))))))
                / (1.0
                    + r * (5.22443271807813073
                        + r * (1.02258209975070629E1
                            + r * (9.28187483709036392
                                + r * (3.9095549184069553
                                    + r * (6.61214199809055912E-1 + 2.89411828874884851E-2 * r)))))));
    }
    -2.0 * S::inverse_norm_cdf(0.5 * (1.0 - beta))
}

/// Normalised implied volatility of an out-of-the-money price `β` at `θx ≤ 0`.
///
/// Returns 0 for `β = 0`, [`VOLATILITY_BELOW_INTRINSIC`] for `β < 0` and
/// [`VOLATILITY_ABOVE_MAXIMUM`] for `β ≥ exp(θx/2)`. NaN propagates.
pub(crate) fn lets_be_rational<S: SpecialFunctions>(
    beta: f64,
    theta_x: f64,
    limits: IterationLimits,
) -> SolverOutcome {
    debug_assert!(!(theta_x > 0.0));
    if beta <= 0.0 {
        let s = if beta == 0.0 { 0.0 } else { VOLATILITY_BELOW_INTRINSIC };
        return SolverOutcome::new(s, 0, SolverBranch::Boundary);
    }
    let b_max = (0.5 * theta_x).exp();
    if beta >= b_max {
        return SolverOutcome::new(VOLATILITY_ABOVE_MAXIMUM, 0, SolverBranch::Boundary);
    }
    if theta_x == 0.0 {
        return SolverOutcome::new(
            implied_volatility_at_the_money::<S>(beta),
            0,
            SolverBranch::AtTheMoney,
        );
    }

    let sqrt_ax = (-theta_x).sqrt();
    let s_c = SQRT_TWO * sqrt_ax;
    let ome = one_minus_erfcx::<S>(sqrt_ax);
    let b_c = 0.5 * b_max * ome;
    let inv_v_c = SQRT_TWO_PI / b_max;

    if beta < b_c {
        let s_l = s_c - SQRT_PI_OVER_TWO * ome;
        debug_assert!(!(s_l <= 0.0));
        let b_l = bl_over_bmax(s_c) * b_max;
        if beta < b_l {
            return lowest_branch::<S>(beta, theta_x, s_l, b_l, limits);
        }
        let inv_v_l = inv_normalised_vega(theta_x, s_l);
        let segment = RationalCubic::new(b_l, b_c, s_l, s_c, inv_v_l, inv_v_c);
        let r = segment.convex_control_fitting_right(0.0, false);
        let s = segment.interpolate(beta, r);
        let bracket = Bracket::new(s_l, s_c, limits, SolverBranch::LowerMiddle);
        return iterate_on_price::<S>(beta, theta_x, s, bracket, limits);
    }

    let s_u = s_c + SQRT_PI_OVER_TWO * (2.0 - ome);
    let b_u = bu_over_bmax(s_c) * b_max;
    if beta <= b_u {
        let inv_v_u = inv_normalised_vega(theta_x, s_u);
        let segment = RationalCubic::new(b_c, b_u, s_c, s_u, inv_v_c, inv_v_u);
        let r = segment.convex_control_fitting_left(0.0, false);
        let s = segment.interpolate(beta, r);
        let bracket = Bracket::new(s_c, s_u, limits, SolverBranch::UpperMiddle);
        return iterate_on_price::<S>(beta, theta_x, s, bracket, limits);
    }

    highest_branch::<S>(beta, theta_x, b_max, s_u, b_u, limits)
}

/// `β < bₗ`: iterate on `g(s) = 1/ln b(s) − 1/ln β`.
fn lowest_branch<S: SpecialFunctions>(
    beta: f64,
    theta_x: f64,
    s_l: f64,
    b_l: f64,
    limits: IterationLimits,
) -> SolverOutcome {
    let lower = lower_map::<S>(theta_x, s_l);
    let segment = RationalCubic::new(0.0, b_l, 0.0, lower.f, 1.0, lower.fp);
    let r = segment.convex_control_fitting_right(lower.fpp, true);
    let mut f = segment.interpolate(beta, r);
    if !(f > 0.0) {
        // quadratic through f(0) = 0, f′(0) = 1 and f(bₗ)
        let t = beta / b_l;
        f = (lower.f * t + b_l * (1.0 - t)) * t;
    }
    let mut s = inverse_lower_map::<S>(theta_x, f);
    debug_assert!(!(s <= 0.0));

    let mut bracket = Bracket::new(DBL_MIN, s_l, limits, SolverBranch::Lowest);
    let ln_beta = beta.ln();
    let mut ds = -DBL_MAX;
    let mut iterations = 0;
    while iterations < limits.max_iterations && ds.abs() > DBL_EPSILON * s {
        if bracket.intercept(&mut s, &mut ds, iterations) {
            break;
        }
        let (bx, ln_vega) = scaled_normalised_black_and_ln_vega::<S>(theta_x, s);
        let ln_b = bx.ln() + ln_vega;
        let bpob = 1.0 / bx;
        let b = ln_b.exp();
        let bp = bpob * b;
        bracket.tighten(s, b - beta);
        if !(b > 0.0 && bp > 0.0) {
            ds = bracket.nest(s, iterations);
        } else {
            let h = theta_x / s;
            let x2_over_s3 = h * h / s;
            let b_h2 = x2_over_s3 - s / 4.0;
            let nu = (ln_beta - ln_b) * ln_b / ln_beta / bpob;
            let lambda = 1.0 / ln_b;
            let otlambda = 1.0 + 2.0 * lambda;
            let h2 = b_h2 - bpob * otlambda;
            let c = 3.0 * (x2_over_s3 / s);
            let b_h3 = b_h2 * b_h2 - c - 0.25;
            let sq_bpob = bpob * bpob;
            let bppob = b_h2 * bpob;
            let mu = 6.0 * lambda * (1.0 + lambda);
            let h3 = b_h3 + sq_bpob * (2.0 + mu) - bppob * 3.0 * otlambda;
            ds = if theta_x < LOWEST_BRANCH_FOURTH_ORDER_THRESHOLD {
                let h4 = (b_h2 * (b_h3 - 0.5) - (b_h2 - 2.0 / s) * 2.0 * c)
                    - bpob
                        * (sq_bpob * (6.0 + lambda * (22.0 + lambda * (36.0 + lambda * 24.0)))
                            - bppob * (12.0 + 6.0 * mu))
                    - bppob * b_h2 * 3.0 * otlambda
                    - b_h3 * bpob * 4.0 * otlambda;
                nu * householder4_factor(nu, h2, h3, h4, limits.method)
            } else {
                nu * householder3_factor(nu, h2, h3, limits.method)
            };
        }
        s += ds;
        iterations += 1;
    }
    SolverOutcome::new(s, iterations, SolverBranch::Lowest)
}

/// `β > bᵤ`. Iterates on `g(s) = ln(β̄) − ln(b̄(s))` with `b̄ = bₘₐₓ − b`
/// when `β > bₘₐₓ/2`, and on `b(s) − β` otherwise.
fn highest_branch<S: SpecialFunctions>(
    beta: f64,
    theta_x: f64,
    b_max: f64,
    s_u: f64,
    b_u: f64,
    limits: IterationLimits,
) -> SolverOutcome {
    let upper = upper_map::<S>(theta_x, s_u);
    let mut f = -DBL_MAX;
    if upper.fpp > -SQRT_DBL_MAX && upper.fpp < SQRT_DBL_MAX {
        let segment = RationalCubic::new(b_u, b_max, upper.f, 0.0, upper.fp, -0.5);
        let r = segment.convex_control_fitting_left(upper.fpp, true);
        f = segment.interpolate(beta, r);
    }
    if f <= 0.0 {
        // quadratic through f(bᵤ), f(bₘₐₓ) = 0 and f′(bₘₐₓ) = −½
        let h = b_max - b_u;
        let t = (beta - b_u) / h;
        f = (upper.f * (1.0 - t) + 0.5 * h * t) * (1.0 - t);
    }
    let mut s = inverse_upper_map::<S>(f);
    debug_assert!(!(s <= 0.0));
    let mut bracket = Bracket::new(s_u, DBL_MAX, limits, SolverBranch::Highest);

    if !(beta > 0.5 * b_max) {
        return iterate_on_price::<S>(beta, theta_x, s, bracket, limits);
    }

    let beta_bar = b_max - beta;
    let mut ds = -DBL_MAX;
    let mut iterations = 0;
    while iterations < limits.max_iterations && ds.abs() > DBL_EPSILON * s {
        if bracket.intercept(&mut s, &mut ds, iterations) {
            break;
        }
        let h = theta_x / s;
        let t = 0.5 * s;
        // g′ = b′/b̄, with b̄ free of cancellation
        let gp = (2.0 / SQRT_TWO_PI)
            / (S::erfcx((t + h) * ONE_OVER_SQRT_TWO) + S::erfcx((t - h) * ONE_OVER_SQRT_TWO));
        let bp = normalised_vega(theta_x, s);
        let b_bar = bp / gp;
        bracket.tighten(s, beta_bar - b_bar);
        if !(b_bar > DBL_MIN && bp > DBL_MIN) {
            ds = bracket.nest(s, iterations);
        } else {
            let g = (beta_bar / b_bar).ln();
            let x2_over_s3 = h * h / s;
            let b_h2 = x2_over_s3 - s / 4.0;
            let c = 3.0 * (x2_over_s3 / s);
            let b_h3 = b_h2 * b_h2 - c - 0.25;
            let nu = -g / gp;
            let h2 = b_h2 + gp;
            let h3 = b_h3 + gp * (2.0 * gp + 3.0 * b_h2);
            ds = if theta_x < HIGHEST_BRANCH_FOURTH_ORDER_THRESHOLD {
                let h4 = (b_h2 * (b_h3 - 0.5) - (b_h2 - 2.0 / s) * 2.0 * c)
                    + gp * (6.0 * gp * (gp + 2.0 * b_h2) + 3.0 * b_h2 * b_h2 + 4.0 * b_h3);
                nu * householder4_factor(nu, h2, h3, h4, limits.method)
            } else {
                nu * householder3_factor(nu, h2, h3, limits.method)
            };
        }
        s += ds;
        iterations += 1;
    }
    SolverOutcome::new(s, iterations, SolverBranch::Highest)
}

/// Iterate on `g(s) = b(s) − β`, where `b″/b′ = x²/s³ − s/4` and
/// `b‴/b′ = (b″/b′)² − 3x²/s⁴ − 1/4`.
fn iterate_on_price<S: SpecialFunctions>(
    beta: f64,
    theta_x: f64,
    mut s: f64,
    mut bracket: Bracket,
    limits: IterationLimits,
) -> SolverOutcome {
    debug_assert!(!(s <= 0.0));
    let mut ds = -DBL_MAX;
    let mut iterations = 0;
    while iterations < limits.max_iterations && ds.abs() > DBL_EPSILON * s {
        if bracket.intercept(&mut s, &mut ds, iterations) {
            break;
        }
        let b = normalised_black::<S>(theta_x, s);
        let inv_bp = inv_normalised_vega(theta_x, s);
        let nu = (beta - b) * inv_bp;
        let h = theta_x / s;
        let x2_over_s3 = h * h / s;
        let h2 = x2_over_s3 - s * 0.25;
        let h3 = h2 * h2 - 3.0 * (x2_over_s3 / s) - 0.25;
        bracket.tighten(s, b - beta);
        ds = nu * householder3_factor(nu, h2, h3, limits.method);
        s += ds;
        iterations += 1;
    }
    SolverOutcome::new(s, iterations, bracket.branch)
}
