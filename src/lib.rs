//! # rationalvol
//!
//! Implied volatility to machine precision for the Black (lognormal) and
//! Bachelier (normal) models.
//!
//! The Black solver follows Peter Jäckel's "Let's Be Rational": a rational
//! initial guess on one of four branches of the price curve, followed by at
//! most two Householder steps. The normal solver is the non-iterative
//! rational inversion of Jäckel's "Implied Normal Volatility".
//!
//! ## Architecture
//!
//! - **`special`**: Cody's erf/erfc/erfcx, the normal CDF and its inverse, `erfinv`
//! - **`rational_cubic`**: Delbourgo-Gregory rational cubic interpolation
//! - **`black`**: Normalised Black prices, Greeks and the implied volatility solver
//! - **`bachelier`**: Normal prices and implied normal volatility
//! - **`implied`**: Validated interface returning [`Result`]
//! - **`config`**: Process-wide solver knobs
//!
//! ## Design
//!
//! - **Two layers.** [`black`] and [`bachelier`] take raw `f64`s and report
//!   edge cases through the sentinels
//!   [`VOLATILITY_BELOW_INTRINSIC`](constants::VOLATILITY_BELOW_INTRINSIC) and
//!   [`VOLATILITY_ABOVE_MAXIMUM`](constants::VOLATILITY_ABOVE_MAXIMUM).
//!   [`implied`] validates inputs and maps sentinels to [`VolError`].
//! - **No panics.** Library code never calls `unwrap()` or `expect()`.
//!   NaN inputs propagate to NaN outputs in the raw layer.
//! - **Thread-safe.** All functions are pure apart from two atomic
//!   configuration knobs, read once per solver call.
//! - **Pluggable special functions.** The Black stack is generic over
//!   [`SpecialFunctions`](special::SpecialFunctions); the plain functions
//!   use [`Cody`](special::Cody).
//! - **Optional logging.** The `logging` feature emits `tracing` debug events
//!   on solver fallbacks, knob changes and rejected prices.
//! - **Fused multiply-add.** The `fma` feature evaluates the rational
//!   approximations with `f64::mul_add`. Enable it only on targets with
//!   hardware FMA; the software fallback is much slower.
//!
//! ## Example
//!
//! ```
//! use rationalvol::{BlackImpliedVol, OptionType, black_price};
//!
//! let price = black_price(100.0, 110.0, 0.25, 1.0, OptionType::Call).unwrap();
//! let vol = BlackImpliedVol::compute(price, 100.0, 110.0, 1.0, OptionType::Call).unwrap();
//! assert!((vol.0 - 0.25).abs() < 1e-14);
//! ```

pub mod bachelier;
pub mod black;
pub mod config;
pub mod constants;
pub mod conventions;
pub mod error;
pub mod implied;
mod polynomial;
pub mod rational_cubic;
pub mod special;
pub mod types;
mod validate;

#[doc(inline)]
pub use error::{Result, VolError};
#[doc(inline)]
pub use implied::{BlackImpliedVol, NormalImpliedVol, black_price, normal_price};
#[doc(inline)]
pub use special::{Cody, SpecialFunctions};
#[doc(inline)]
pub use types::{OptionType, Vol};
