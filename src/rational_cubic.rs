//! Shape-preserving rational cubic interpolation (Delbourgo & Gregory).
//!
//! On a segment `[x_l, x_r]` with end values `y_l, y_r` and end slopes
//! `d_l, d_r`, the interpolant is
//!
//! ```text
//!        y_r·t³ + (r·y_r − h·d_r)·t²(1−t) + (r·y_l + h·d_l)·t(1−t)² + y_l·(1−t)³
//! y(t) = ─────────────────────────────────────────────────────────────────────────
//!                                  1 + (r − 3)·t(1−t)
//! ```
//!
//! with `h = x_r − x_l` and `t = (x − x_l)/h`. The control parameter `r`
//! blends between the cubic Hermite interpolant (`r = 3`) and linear
//! interpolation (`r → ∞`). The solver seeds its initial guesses by
//! choosing `r` so that the curve matches a known second derivative at one
//! end, clamped from below so the segment stays monotone and convex.
//!
//! # References
//! - Delbourgo, R. and Gregory, J. A. "Shape preserving piecewise rational
//!   interpolation", SIAM J. Sci. Stat. Comput. 6 (1985), pp. 967–976.
//! - Jäckel, P. "Let's Be Rational", Wilmott (2015), pp. 40–53.

/// Smallest admissible control parameter: `−(1 − √ε)`.
pub const MINIMUM_CONTROL_PARAMETER: f64 = -(1.0 - 1.4901161193847656e-8);

/// Control parameters at or above this value select linear interpolation.
pub const MAXIMUM_CONTROL_PARAMETER: f64 = 2.0 / (f64::EPSILON * f64::EPSILON);

/// One segment of a rational cubic interpolant: end points and end slopes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RationalCubic {
    /// Left abscissa.
    pub x_l: f64,
    /// Right abscissa.
    pub x_r: f64,
    /// Value at `x_l`.
    pub y_l: f64,
    /// Value at `x_r`.
    pub y_r: f64,
    /// Slope at `x_l`.
    pub d_l: f64,
    /// Slope at `x_r`.
    pub d_r: f64,
}

impl RationalCubic {
    /// Create a segment from its end points `(x_l, y_l)`, `(x_r, y_r)` and end slopes.
    pub fn new(x_l: f64, x_r: f64, y_l: f64, y_r: f64, d_l: f64, d_r: f64) -> Self {
        Self {
            x_l,
            x_r,
            y_l,
            y_r,
            d_l,
            d_r,
        }
    }

    /// Secant slope `(y_r − y_l)/(x_r − x_l)`.
    #[inline]
    pub fn secant(&self) -> f64 {
        (self.y_r - self.y_l) / (self.x_r - self.x_l)
    }

    /// Evaluate the interpolant at `x` with control parameter `r`.
    ///
    /// A degenerate segment (`x_l == x_r`) returns the midpoint of the end
    /// values. For `r ≥ MAXIMUM_CONTROL_PARAMETER` the result is linear.
    pub fn interpolate(&self, x: f64, r: f64) -> f64 {
        let h = self.x_r - self.x_l;
        if h == 0.0 {
            return 0.5 * (self.y_l + self.y_r);
        }
        let t = (x - self.x_l) / h;
        if r < MAXIMUM_CONTROL_PARAMETER {
            let omt = 1.0 - t;
            let t2 = t * t;
            let omt2 = omt * omt;
            return (self.y_r * t2 * t
                + (r * self.y_r - h * self.d_r) * t2 * omt
                + (r * self.y_l + h * self.d_l) * t * omt2
                + self.y_l * omt2 * omt)
                / (1.0 + (r - 3.0) * t * omt);
        }
        self.y_r * t + self.y_l * (1.0 - t)
    }

    /// Control parameter that makes the second derivative at `x_l` equal `y2_l`.
    pub fn control_to_fit_left_curvature(&self, y2_l: f64) -> f64 {
        let h = self.x_r - self.x_l;
        let numerator = 0.5 * h * y2_l + (self.d_r - self.d_l);
        if numerator == 0.0 {
            return 0.0;
        }
        let denominator = (self.y_r - self.y_l) / h - self.d_l;
        saturating_ratio(numerator, denominator)
    }

    /// Control parameter that makes the second derivative at `x_r` equal `y2_r`.
    pub fn control_to_fit_right_curvature(&self, y2_r: f64) -> f64 {
        let h = self.x_r - self.x_l;
        let numerator = 0.5 * h * y2_r + (self.d_r - self.d_l);
        if numerator == 0.0 {
            return 0.0;
        }
        let denominator = self.d_r - (self.y_r - self.y_l) / h;
        saturating_ratio(numerator, denominator)
    }

    /// Smallest control parameter that keeps the segment monotone and/or
    /// convex (or concave), whichever properties the end data admit.
    pub fn minimum_control(&self, prefer_shape_preservation: bool) -> f64 {
        minimum_control_parameter(self.d_l, self.d_r, self.secant(), prefer_shape_preservation)
    }

    /// Fit the second derivative `y2_l` at `x_l`, but never below
    /// [`minimum_control`](Self::minimum_control).
    pub fn convex_control_fitting_left(&self, y2_l: f64, prefer_shape_preservation: bool) -> f64 {
        self.control_to_fit_left_curvature(y2_l)
            .max(self.minimum_control(prefer_shape_preservation))
    }

    /// Fit the second derivative `y2_r` at `x_r`, but never below
    /// [`minimum_control`](Self::minimum_control).
    pub fn convex_control_fitting_right(&self, y2_r: f64, prefer_shape_preservation: bool) -> f64 {
        self.control_to_fit_right_curvature(y2_r)
            .max(self.minimum_control(prefer_shape_preservation))
    }
}

#[inline]
fn saturating_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        if numerator > 0.0 {
            MAXIMUM_CONTROL_PARAMETER
        } else {
            MINIMUM_CONTROL_PARAMETER
        }
    } else {
        numerator / denominator
    }
}

/// Lower bound on the control parameter for end slopes `d_l`, `d_r` and secant `s`.
///
/// Monotone data require `r ≥ (d_l + d_r)/s`; convex or concave data require
/// `r ≥ |(d_r − d_l)/min(d_r − s, s − d_l)|`. Where a bound is undefined
/// (zero secant or a slope equal to the secant), shape preservation forces
/// linear interpolation and smoothness drops the bound.
pub fn minimum_control_parameter(d_l: f64, d_r: f64, s: f64, prefer_shape_preservation: bool) -> f64 {
    let monotonic = d_l * s >= 0.0 && d_r * s >= 0.0;
    let convex = d_l <= s && s <= d_r;
    let concave = d_l >= s && s >= d_r;
    if !monotonic && !convex && !concave {
        return MINIMUM_CONTROL_PARAMETER;
    }
    let d_r_m_d_l = d_r - d_l;
    let d_r_m_s = d_r - s;
    let s_m_d_l = s - d_l;
    let r1 = if monotonic {
        if s != 0.0 {
            (d_r + d_l) / s
        } else if prefer_shape_preservation {
            MAXIMUM_CONTROL_PARAMETER
        } else {
            f64::MIN
        }
    } else {
        f64::MIN
    };
    let r2 = if convex || concave {
        if s_m_d_l != 0.0 && d_r_m_s != 0.0 {
            (d_r_m_d_l / d_r_m_s.min(s_m_d_l)).abs()
        } else if prefer_shape_preservation {
            MAXIMUM_CONTROL_PARAMETER
        } else {
            f64::MIN
        }
    } else if monotonic && prefer_shape_preservation {
        MAXIMUM_CONTROL_PARAMETER
    } else {
        f64::MIN
    };
    r1.max(r2).max(MINIMUM_CONTROL_PARAMETER)
}
