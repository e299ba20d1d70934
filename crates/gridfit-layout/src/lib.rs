#![forbid(unsafe_code)]

//! Deterministic space distribution for layout containers.
//!
//! Given the space a container has to fill and each child's `[min, max]`
//! extent, [`distribute`] returns one size per child such that
//!
//! - every size lies within its child's extent,
//! - the sizes add up to the available space, clamped to what the extents can
//!   reach (within one device pixel per child),
//! - every size falls on the device-pixel grid of the output scale.
//!
//! Space moves one whole device pixel at a time, round-robin in input order.
//! One more pixel of available space therefore changes exactly one child, and
//! always the same one: the first child in order that is due a pixel and has
//! room for it.
//!
//! ```
//! use gridfit_layout::distribute;
//!
//! let sizes = distribute(17.0, 1.0, &[2.0, 6.0, 5.0], &[5.0, 14.0, 9.0]).unwrap();
//! assert_eq!(sizes, vec![4.0, 7.0, 6.0]);
//! ```

pub use gridfit_core::PixelGrid;
pub use gridfit_core::scaled_math;

pub mod cache;
pub mod debug;
pub mod error;
pub mod notation;
pub mod request;
pub mod solver;

pub use cache::{DistributionCache, DistributionCacheKey, DistributionCacheStats};
pub use error::DistributeError;
pub use request::{Distribution, DistributionRequest};

use serde::{Deserialize, Serialize};

/// Allowed size range of one child, in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    /// Create an extent.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// An extent that only admits one size.
    pub const fn fixed(size: f64) -> Self {
        Self::new(size, size)
    }

    /// An extent with no upper bound.
    pub const fn at_least(min: f64) -> Self {
        Self::new(min, f64::INFINITY)
    }
}

/// Where children start and which way pixels move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Start at the minimums and hand out pixels.
    #[default]
    Grow,
    /// Start at the maximums and take pixels back.
    Shrink,
}

/// Configured space distributor.
///
/// ```
/// use gridfit_layout::{SpaceDistributor, Strategy};
///
/// let distributor = SpaceDistributor::new().pixel_scale(2.0);
/// let sizes = distributor.distribute(3.0, &[1.0, 1.0], &[4.0, 4.0]).unwrap();
/// assert_eq!(sizes, vec![1.5, 1.5]);
///
/// let shrink = distributor.strategy(Strategy::Shrink);
/// let sizes = shrink.distribute(7.5, &[1.0, 1.0], &[4.0, 4.0]).unwrap();
/// assert_eq!(sizes, vec![3.5, 4.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceDistributor {
    pixel_scale: f64,
    strategy: Strategy,
}

impl Default for SpaceDistributor {
    fn default() -> Self {
        Self {
            pixel_scale: 1.0,
            strategy: Strategy::Grow,
        }
    }
}

impl SpaceDistributor {
    /// Grow strategy at scale 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device pixels per logical unit.
    pub fn pixel_scale(mut self, pixel_scale: f64) -> Self {
        self.pixel_scale = pixel_scale;
        self
    }

    /// Set the strategy.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The configured scale.
    pub fn scale(&self) -> f64 {
        self.pixel_scale
    }

    /// The configured strategy.
    pub fn current_strategy(&self) -> Strategy {
        self.strategy
    }

    /// Distribute `available` space over children with the given extents.
    pub fn distribute(
        &self,
        available: f64,
        minimums: &[f64],
        maximums: &[f64],
    ) -> Result<Vec<f64>, DistributeError> {
        let mut sizes = Vec::with_capacity(minimums.len());
        self.distribute_into(available, minimums, maximums, &mut sizes)?;
        Ok(sizes)
    }

    /// Like [`distribute`](Self::distribute), reusing `out` for the result.
    ///
    /// `out` is cleared first. On error it is left untouched.
    pub fn distribute_into(
        &self,
        available: f64,
        minimums: &[f64],
        maximums: &[f64],
        out: &mut Vec<f64>,
    ) -> Result<(), DistributeError> {
        let grid = solver::validate(
            available,
            self.pixel_scale,
            minimums,
            maximums,
            self.strategy,
        )?;
        solver::solve_into(available, grid, minimums, maximums, self.strategy, out);
        Ok(())
    }

    /// Distribute over [`Extent`] pairs.
    pub fn distribute_extents(
        &self,
        available: f64,
        extents: &[Extent],
    ) -> Result<Vec<f64>, DistributeError> {
        let (minimums, maximums): (Vec<f64>, Vec<f64>) =
            extents.iter().map(|e| (e.min, e.max)).unzip();
        self.distribute(available, &minimums, &maximums)
    }
}

/// Grow children from their minimums to fill `available`.
///
/// See the [crate docs](crate) for the guarantees.
pub fn distribute(
    available: f64,
    pixel_scale: f64,
    minimums: &[f64],
    maximums: &[f64],
) -> Result<Vec<f64>, DistributeError> {
    SpaceDistributor::new()
        .pixel_scale(pixel_scale)
        .distribute(available, minimums, maximums)
}

/// Shrink children from their maximums until they fit `available`.
pub fn shrink(
    available: f64,
    pixel_scale: f64,
    minimums: &[f64],
    maximums: &[f64],
) -> Result<Vec<f64>, DistributeError> {
    SpaceDistributor::new()
        .pixel_scale(pixel_scale)
        .strategy(Strategy::Shrink)
        .distribute(available, minimums, maximums)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINS: [f64; 3] = [2.0, 6.0, 5.0];
    const MAXS: [f64; 3] = [5.0, 14.0, 9.0];

    #[test]
    fn no_children_yields_empty_result() {
        assert!(distribute(100.0, 1.0, &[], &[]).unwrap().is_empty());
        assert!(distribute(f64::INFINITY, 1.5, &[], &[]).unwrap().is_empty());
        assert!(shrink(0.0, 2.0, &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn single_child_is_clamped_and_snapped() {
        assert_eq!(distribute(7.0, 1.0, &[2.0], &[10.0]).unwrap(), vec![7.0]);
        assert_eq!(distribute(1.0, 1.0, &[2.0], &[10.0]).unwrap(), vec![2.0]);
        assert_eq!(distribute(50.0, 1.0, &[2.0], &[10.0]).unwrap(), vec![10.0]);
        assert_eq!(distribute(7.3, 2.0, &[2.0], &[10.0]).unwrap(), vec![7.0]);
        assert_eq!(shrink(7.3, 2.0, &[2.0], &[10.0]).unwrap(), vec![7.0]);
    }

    #[test]
    fn growth_goes_to_first_eligible_child() {
        assert_eq!(distribute(14.0, 1.0, &MINS, &MAXS).unwrap(), vec![3.0, 6.0, 5.0]);
        assert_eq!(distribute(15.0, 1.0, &MINS, &MAXS).unwrap(), vec![3.0, 7.0, 5.0]);
        assert_eq!(distribute(16.0, 1.0, &MINS, &MAXS).unwrap(), vec![3.0, 7.0, 6.0]);
        assert_eq!(distribute(17.0, 1.0, &MINS, &MAXS).unwrap(), vec![4.0, 7.0, 6.0]);
    }

    #[test]
    fn unbounded_space_saturates_at_maximums() {
        for available in [f64::INFINITY, f64::MAX] {
            assert_eq!(
                distribute(available, 1.0, &MINS, &MAXS).unwrap(),
                MAXS.to_vec()
            );
            assert_eq!(
                distribute(available, 2.0, &[0.0, 0.0], &[3.0, 6.0]).unwrap(),
                vec![3.0, 6.0]
            );
        }
        let sizes = distribute(f64::MAX, 1.25, &[1.0], &[f64::MAX]).unwrap();
        assert_eq!(sizes, vec![f64::MAX]);
    }

    #[test]
    fn infinite_maximum_takes_the_rest() {
        let sizes = distribute(100.0, 1.0, &[0.0, 0.0], &[10.0, f64::INFINITY]).unwrap();
        assert_eq!(sizes, vec![10.0, 90.0]);
        let sizes = distribute(f64::INFINITY, 1.0, &[0.0, 0.0], &[10.0, f64::INFINITY]).unwrap();
        assert_eq!(sizes, vec![10.0, f64::INFINITY]);
    }

    #[test]
    fn shrink_takes_from_first_child_above_minimum() {
        assert_eq!(shrink(27.0, 1.0, &MINS, &MAXS).unwrap(), vec![4.0, 14.0, 9.0]);
        assert_eq!(shrink(20.0, 1.0, &MINS, &MAXS).unwrap(), vec![2.0, 11.0, 7.0]);
        assert_eq!(shrink(0.0, 1.0, &MINS, &MAXS).unwrap(), MINS.to_vec());
    }

    #[test]
    fn preconditions_fail_fast() {
        assert_eq!(
            distribute(10.0, -1.0, &[0.0], &[1.0]),
            Err(DistributeError::InvalidPixelScale { scale: -1.0 })
        );
        assert!(matches!(
            distribute(f64::NAN, 1.0, &[0.0], &[1.0]),
            Err(DistributeError::InvalidAvailableSpace { available }) if available.is_nan()
        ));
        assert_eq!(
            distribute(-0.5, 1.0, &[0.0], &[1.0]),
            Err(DistributeError::InvalidAvailableSpace { available: -0.5 })
        );
        assert!(matches!(
            distribute(10.0, 1.0, &[f64::NAN], &[1.0]),
            Err(DistributeError::InvalidExtent { index: 0, .. })
        ));
        assert_eq!(
            shrink(10.0, 1.0, &[0.0], &[f64::INFINITY]),
            Err(DistributeError::UnboundedMaximum { index: 0 })
        );
    }

    #[test]
    fn distribute_into_reuses_storage() {
        let distributor = SpaceDistributor::new();
        let mut out = vec![99.0; 8];
        distributor
            .distribute_into(16.0, &MINS, &MAXS, &mut out)
            .unwrap();
        assert_eq!(out, vec![3.0, 7.0, 6.0]);

        let before = out.clone();
        assert!(
            distributor
                .distribute_into(16.0, &MINS, &MAXS[..2], &mut out)
                .is_err()
        );
        assert_eq!(out, before);
    }

    #[test]
    fn extents_match_slice_form() {
        let extents = [
            Extent::new(2.0, 5.0),
            Extent::fixed(6.0),
            Extent::at_least(5.0),
        ];
        let sizes = SpaceDistributor::new()
            .distribute_extents(20.0, &extents)
            .unwrap();
        assert_eq!(sizes, vec![5.0, 6.0, 9.0]);
    }

    #[test]
    fn builder_round_trips_configuration() {
        let d = SpaceDistributor::new()
            .pixel_scale(1.75)
            .strategy(Strategy::Shrink);
        assert_eq!(d.scale(), 1.75);
        assert_eq!(d.current_strategy(), Strategy::Shrink);
        assert_eq!(SpaceDistributor::default().current_strategy(), Strategy::Grow);
    }
}
