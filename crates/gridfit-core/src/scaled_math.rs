#![forbid(unsafe_code)]

//! Rounding onto a device-pixel grid.
//!
//! A logical value `v` is *on the grid* for a scale `s` when `v * s` is an
//! integer. [`ceil`], [`floor`] and [`rint`] move a value onto the grid in the
//! usual directions, rounding in device-pixel space and dividing back.
//!
//! Two details make these safe to compose in layout code:
//!
//! - Products within one ulp of an integer count as that integer, so values
//!   that picked up representation noise (`0.1 + 0.2`) do not jump a whole
//!   pixel. This is also what makes `ceil(ceil(x))` a fixed point.
//! - Extreme magnitudes never produce NaN. A product that overflows leaves the
//!   value unchanged for `ceil`/`floor`; a rounding step that leaves the
//!   representable range reports the matching infinity.
//!
//! `scale` must be finite and strictly positive. [`crate::PixelGrid`] wraps a
//! validated scale.

/// Magnitude from which every `f64` is an integer (2^52).
const NO_FRACTION: f64 = 4_503_599_627_370_496.0;

/// Size of the gap between `value` and the next `f64` farther from zero.
///
/// `ulp(±INF)` is `INF`, `ulp(NaN)` is NaN and `ulp(f64::MAX)` is `2^971`.
#[must_use]
pub fn ulp(value: f64) -> f64 {
    let magnitude = value.abs();
    if !magnitude.is_finite() {
        return magnitude;
    }
    let bits = magnitude.to_bits();
    if bits == f64::MAX.to_bits() {
        return magnitude - f64::from_bits(bits - 1);
    }
    f64::from_bits(bits + 1) - magnitude
}

/// Smallest grid value that is `>= value`.
///
/// ```
/// use gridfit_core::scaled_math::ceil;
///
/// assert_eq!(ceil(1.2, 2.0), 1.5);
/// assert_eq!(ceil(0.1 + 0.2, 10.0), 0.3);
/// assert_eq!(ceil(f64::MAX, 1.5), f64::MAX);
/// ```
#[must_use]
pub fn ceil(value: f64, scale: f64) -> f64 {
    debug_assert!(scale.is_finite() && scale > 0.0, "invalid scale {scale}");
    let d = value * scale;
    if d.is_infinite() {
        return value;
    }
    let nudged = d - ulp(d);
    if d.abs() >= NO_FRACTION {
        return saturate(value, nudged / scale);
    }
    // `+ 0.0` turns a -0.0 result into 0.0.
    nudged.ceil() / scale + 0.0
}

/// Largest grid value that is `<= value`.
///
/// ```
/// use gridfit_core::scaled_math::floor;
///
/// assert_eq!(floor(1.2, 2.0), 1.0);
/// assert_eq!(floor(f64::MAX, 0.5), f64::INFINITY);
/// ```
#[must_use]
pub fn floor(value: f64, scale: f64) -> f64 {
    debug_assert!(scale.is_finite() && scale > 0.0, "invalid scale {scale}");
    let d = value * scale;
    if d.is_infinite() {
        return value;
    }
    let nudged = d + ulp(d);
    if d.abs() >= NO_FRACTION {
        return saturate(value, nudged / scale);
    }
    nudged.floor() / scale + 0.0
}

/// Nearest grid value; pixel-space ties go to the even pixel.
///
/// ```
/// use gridfit_core::scaled_math::rint;
///
/// assert_eq!(rint(0.25, 2.0), 0.0);
/// assert_eq!(rint(0.75, 2.0), 1.0);
/// assert_eq!(rint(f64::MAX, 1.5), f64::INFINITY);
/// ```
#[must_use]
pub fn rint(value: f64, scale: f64) -> f64 {
    debug_assert!(scale.is_finite() && scale > 0.0, "invalid scale {scale}");
    (value * scale).round_ties_even() / scale + 0.0
}

/// Whole-pixel products only move when the one-ulp nudge overflows.
#[inline]
fn saturate(value: f64, nudged: f64) -> f64 {
    if nudged.is_infinite() { nudged } else { value }
}
