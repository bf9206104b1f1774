//! Validated pricing and implied volatility.
//!
//! The raw kernels in [`crate::black`] and [`crate::bachelier`] signal edge
//! cases through sentinel values. This module checks inputs first and
//! reports failures as [`VolError`](crate::VolError):
//!
//! - [`BlackImpliedVol`]: Black (lognormal) model via Jäckel's "Let's Be Rational"
//! - [`NormalImpliedVol`]: Bachelier (normal) model for rates and short-dated FX

pub mod black;
pub mod normal;

pub use black::{black_price, BlackImpliedVol};
pub use normal::{normal_price, NormalImpliedVol};
