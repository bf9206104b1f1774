//! Numerical constants shared by the pricing and inversion kernels.
//!
//! Irrational constants are written out to more digits than binary64 holds;
//! the compiler rounds them to the nearest representable value.

/// Machine epsilon, the gap between 1 and the next representable `f64`.
pub const DBL_EPSILON: f64 = f64::EPSILON;

/// Smallest positive normal `f64`.
pub const DBL_MIN: f64 = f64::MIN_POSITIVE;

/// Largest finite `f64`.
pub const DBL_MAX: f64 = f64::MAX;

/// Volatility returned when the price lies below intrinsic value.
pub const VOLATILITY_BELOW_INTRINSIC: f64 = -f64::MAX;

/// Volatility returned when the price is at or above the attainable maximum.
pub const VOLATILITY_ABOVE_MAXIMUM: f64 = f64::MAX;

pub(crate) const SQRT_TWO: f64 = 1.414_213_562_373_095_048_801_688_724_209_698_078_569_671_875_376_9;
pub(crate) const ONE_OVER_SQRT_TWO: f64 = 0.707_106_781_186_547_524_400_844_362_104_849_039_284_835_937_688_5;
pub(crate) const SQRT_TWO_PI: f64 = 2.506_628_274_631_000_502_415_765_284_811_045_253_006_986_740_609_9;
pub(crate) const ONE_OVER_SQRT_TWO_PI: f64 = 0.398_942_280_401_432_677_939_946_059_934_381_868_475_858_631_164_9;
pub(crate) const LN_TWO_PI: f64 = 1.837_877_066_409_345_483_560_659_472_811_235_279_722_794_947_275_6;
pub(crate) const SQRT_PI_OVER_TWO: f64 = 1.253_314_137_315_500_251_207_882_642_405_522_626_503_493_370_305;
pub(crate) const TWO_PI: f64 = 6.283_185_307_179_586_476_925_286_766_559_005_768_394_338_798_750;
pub(crate) const SQRT_THREE: f64 = 1.732_050_807_568_877_293_527_446_341_505_872_366_942_805_253_810;
pub(crate) const SQRT_ONE_OVER_THREE: f64 = 0.577_350_269_189_625_764_509_148_780_501_957_455_647_601_751_270;
pub(crate) const TWO_PI_OVER_SQRT_TWENTY_SEVEN: f64 = 1.209_199_576_156_145_233_729_385_505_094_770_488_189_377_498_728;
pub(crate) const SQRT_THREE_OVER_THIRD_ROOT_TWO_PI: f64 = 0.938_643_487_427_383_566_075_051_356_115_075_878_414_688_769_574;
pub(crate) const PI_OVER_SIX: f64 = 0.523_598_775_598_298_873_077_107_230_546_583_814_032_861_566_563;

/// √(DBL_MIN).
pub(crate) const SQRT_DBL_MIN: f64 = 1.491_668_146_240_041_3e-154;
/// √(DBL_MAX).
pub(crate) const SQRT_DBL_MAX: f64 = 1.340_780_792_994_259_6e154;
/// DBL_EPSILON^(1/16) = 2^(-3.25).
pub(crate) const SIXTEENTH_ROOT_DBL_EPSILON: f64 = 0.105_112_051_906_714_31;
