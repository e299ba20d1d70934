#![forbid(unsafe_code)]

//! Precondition failures reported by the distributor.

use std::fmt;

/// A distribution request the caller should never have made.
///
/// Every variant points at a defect in the layout pass that computed the
/// inputs; nothing is clamped or repaired on the caller's behalf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistributeError {
    /// `minimums` and `maximums` have different lengths.
    LengthMismatch { minimums: usize, maximums: usize },
    /// Pixel scale is NaN, infinite, zero or negative.
    InvalidPixelScale { scale: f64 },
    /// Available space is NaN or negative.
    InvalidAvailableSpace { available: f64 },
    /// A child's extent is unusable: negative, NaN or infinite minimum, NaN
    /// maximum, or `min > max`.
    InvalidExtent { index: usize, min: f64, max: f64 },
    /// Shrinking starts every child at its snapped maximum, which must be a
    /// finite pixel count. Infinite maximums and `f64::MAX` are rejected, as
    /// is the first child at which the total of the maximums overflows.
    UnboundedMaximum { index: usize },
}

impl fmt::Display for DistributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { minimums, maximums } => write!(
                f,
                "got {minimums} minimums but {maximums} maximums; one pair per child is required"
            ),
            Self::InvalidPixelScale { scale } => {
                write!(f, "pixel scale must be finite and positive, got {scale}")
            }
            Self::InvalidAvailableSpace { available } => write!(
                f,
                "available space must be non-negative (or +inf), got {available}"
            ),
            Self::InvalidExtent { index, min, max } => {
                write!(f, "child {index} has invalid extent [{min}, {max}]")
            }
            Self::UnboundedMaximum { index } => write!(
                f,
                "child {index} has an unbounded maximum; shrinking needs finite maximums"
            ),
        }
    }
}

impl std::error::Error for DistributeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_child() {
        let err = DistributeError::InvalidExtent {
            index: 2,
            min: 5.0,
            max: 3.0,
        };
        assert_eq!(err.to_string(), "child 2 has invalid extent [5, 3]");
        assert!(
            DistributeError::UnboundedMaximum { index: 0 }
                .to_string()
                .contains("child 0")
        );
    }

    #[test]
    fn errors_are_boxable() {
        let boxed: Box<dyn std::error::Error> =
            Box::new(DistributeError::InvalidPixelScale { scale: 0.0 });
        assert_eq!(
            boxed.to_string(),
            "pixel scale must be finite and positive, got 0"
        );
    }
}
