//! Special functions of the normal distribution.
//!
//! The free functions in this module are the crate's own implementations.
//! The [`SpecialFunctions`] trait groups them so the Black stack can be
//! instantiated with a different provider (for example one backed by a
//! multi-precision library when generating reference values), with
//! [`Cody`] as the default.

mod erf_cody;
mod normal;

pub use erf_cody::{erf, erfc, erfcx};
pub use normal::{erfinv, inverse_norm_cdf, norm_cdf, norm_pdf};

pub(crate) use erf_cody::CODY_THRESHOLD;

/// Provider of the error function family and the normal distribution.
///
/// All methods are associated functions: an implementor is a zero-sized
/// marker type, selected at compile time via a generic parameter.
///
/// # Examples
///
/// ```
/// use rationalvol::special::{Cody, SpecialFunctions};
///
/// struct Libm;
///
/// impl SpecialFunctions for Libm {
///     fn erf(x: f64) -> f64 { Cody::erf(x) }
///     fn erfc(x: f64) -> f64 { Cody::erfc(x) }
///     fn erfcx(x: f64) -> f64 { Cody::erfcx(x) }
///     fn erfinv(x: f64) -> f64 { Cody::erfinv(x) }
///     fn inverse_norm_cdf(p: f64) -> f64 { Cody::inverse_norm_cdf(p) }
/// }
///
/// assert_eq!(Libm::norm_cdf(0.0), 0.5);
/// ```
pub trait SpecialFunctions {
    /// Error function.
    fn erf(x: f64) -> f64;

    /// Complementary error function.
    fn erfc(x: f64) -> f64;

    /// Scaled complementary error function `exp(x²)·erfc(x)`.
    fn erfcx(x: f64) -> f64;

    /// Inverse error function.
    fn erfinv(x: f64) -> f64;

    /// Inverse standard normal distribution function.
    fn inverse_norm_cdf(p: f64) -> f64;

    /// Standard normal density.
    fn norm_pdf(x: f64) -> f64 {
        norm_pdf(x)
    }

    /// Standard normal distribution function, `½·erfc(−x/√2)` unless overridden.
    fn norm_cdf(x: f64) -> f64 {
        0.5 * Self::erfc(-x * crate::constants::ONE_OVER_SQRT_TWO)
    }
}

/// The crate's own special functions: Cody's error functions and the
/// two-stage rational normal quantile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cody;

impl SpecialFunctions for Cody {
    #[inline]
    fn erf(x: f64) -> f64 {
        erf(x)
    }

    #[inline]
    fn erfc(x: f64) -> f64 {
        erfc(x)
    }

    #[inline]
    fn erfcx(x: f64) -> f64 {
        erfcx(x)
    }

    #[inline]
    fn erfinv(x: f64) -> f64 {
        erfinv(x)
    }

    #[inline]
    fn inverse_norm_cdf(p: f64) -> f64 {
        inverse_norm_cdf(p)
    }

    #[inline]
    fn norm_cdf(x: f64) -> f64 {
        norm_cdf(x)
    }
}
