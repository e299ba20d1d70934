#![forbid(unsafe_code)]

//! A validated device-pixel grid.

use crate::scaled_math;

/// Device-pixel grid for one output scale.
///
/// Wraps a finite, strictly positive scale factor (device pixels per logical
/// unit) and exposes the snapping operations layout code needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelGrid {
    scale: f64,
}

impl PixelGrid {
    /// One device pixel per logical unit.
    pub const UNIT: Self = Self { scale: 1.0 };

    /// Create a grid, rejecting NaN, infinite, zero and negative scales.
    #[must_use]
    pub fn new(scale: f64) -> Option<Self> {
        if scale.is_finite() && scale > 0.0 {
            Some(Self { scale })
        } else {
            None
        }
    }

    /// Device pixels per logical unit.
    #[inline]
    #[must_use]
    pub const fn scale(self) -> f64 {
        self.scale
    }

    /// Logical size of one device pixel.
    #[inline]
    #[must_use]
    pub fn unit(self) -> f64 {
        1.0 / self.scale
    }

    /// See [`scaled_math::ceil`].
    #[inline]
    #[must_use]
    pub fn ceil(self, value: f64) -> f64 {
        scaled_math::ceil(value, self.scale)
    }

    /// See [`scaled_math::floor`].
    #[inline]
    #[must_use]
    pub fn floor(self, value: f64) -> f64 {
        scaled_math::floor(value, self.scale)
    }

    /// See [`scaled_math::rint`].
    #[inline]
    #[must_use]
    pub fn rint(self, value: f64) -> f64 {
        scaled_math::rint(value, self.scale)
    }

    /// Snap a size so content is never clipped (rounds up).
    #[inline]
    #[must_use]
    pub fn snap_size(self, value: f64) -> f64 {
        self.ceil(value)
    }

    /// Snap a position to the nearest pixel edge.
    #[inline]
    #[must_use]
    pub fn snap_position(self, value: f64) -> f64 {
        self.rint(value)
    }

    /// Snap spacing (gaps, insets) to the nearest pixel.
    #[inline]
    #[must_use]
    pub fn snap_space(self, value: f64) -> f64 {
        self.rint(value)
    }

    /// Whole device pixels covered by a logical value, rounded to nearest.
    ///
    /// Values already on the grid map back to their exact pixel count even
    /// after a lossy `k / scale * scale` round trip.
    #[inline]
    #[must_use]
    pub fn to_pixels(self, value: f64) -> f64 {
        (value * self.scale).round_ties_even()
    }

    /// Logical value of a device-pixel count.
    #[inline]
    #[must_use]
    pub fn from_pixels(self, pixels: f64) -> f64 {
        pixels / self.scale
    }

    /// Whether `value` already sits on the grid, within one ulp of the
    /// device-pixel product.
    #[must_use]
    pub fn is_aligned(self, value: f64) -> bool {
        let d = value * self.scale;
        if !d.is_finite() {
            return false;
        }
        (d - d.round_ties_even()).abs() <= scaled_math::ulp(d)
    }
}

impl Default for PixelGrid {
    fn default() -> Self {
        Self::UNIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unusable_scales() {
        assert!(PixelGrid::new(0.0).is_none());
        assert!(PixelGrid::new(-1.5).is_none());
        assert!(PixelGrid::new(f64::NAN).is_none());
        assert!(PixelGrid::new(f64::INFINITY).is_none());
        assert_eq!(PixelGrid::new(1.25).map(PixelGrid::scale), Some(1.25));
    }

    #[test]
    fn snapping_vocabulary() {
        let grid = PixelGrid::new(2.0).unwrap();
        assert_eq!(grid.unit(), 0.5);
        assert_eq!(grid.snap_size(1.1), 1.5);
        assert_eq!(grid.snap_position(1.1), 1.0);
        assert_eq!(grid.snap_space(1.3), 1.5);
        assert_eq!(grid.floor(1.4), 1.0);
    }

    #[test]
    fn pixel_round_trip_recovers_counts() {
        let grid = PixelGrid::new(1.5).unwrap();
        for px in 0..500 {
            let logical = grid.from_pixels(f64::from(px));
            assert_eq!(grid.to_pixels(logical), f64::from(px));
            assert!(grid.is_aligned(logical), "px={px}");
        }
        assert!(!grid.is_aligned(0.5));
        assert!(!grid.is_aligned(f64::INFINITY));
    }

    #[test]
    fn default_is_unit_scale() {
        assert_eq!(PixelGrid::default(), PixelGrid::UNIT);
        assert_eq!(PixelGrid::UNIT.to_pixels(3.4), 3.0);
    }
}
