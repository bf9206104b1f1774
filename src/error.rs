//! Error types for the validated interface.
//!
//! The numerical core in [`black`](crate::black) and
//! [`bachelier`](crate::bachelier) reports edge cases through sentinel
//! values. The [`implied`](crate::implied) layer validates its inputs and
//! turns those sentinels into a `Result<T, VolError>`.

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, VolError>;

/// Errors returned by the validated pricing and implied volatility functions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VolError {
    /// Input data is invalid (e.g., NaN price, zero forward, negative expiry).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The option price is below its intrinsic value; no volatility reproduces it.
    #[error("price {price} is below intrinsic value {intrinsic}")]
    PriceBelowIntrinsic { price: f64, intrinsic: f64 },

    /// The option price is at or above the largest attainable price.
    #[error("price {price} is at or above the attainable maximum {maximum}")]
    PriceAboveMaximum { price: f64, maximum: f64 },

    /// Numerical computation failed (e.g., a non-finite result).
    #[error("numerical error: {message}")]
    NumericalError { message: String },
}
