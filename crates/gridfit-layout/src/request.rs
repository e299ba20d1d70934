#![forbid(unsafe_code)]

//! Owned, serializable distribution requests and results.
//!
//! The slice-based entry points suit layout code that already holds its
//! minimum and maximum arrays. [`DistributionRequest`] bundles the same
//! inputs into one value for fixtures, caching, and debug records.
//!
//! JSON cannot carry infinities, so an unbounded maximum is written as
//! `f64::MAX`. Growing treats it as a very large finite bound. Shrinking
//! rejects it with [`DistributeError::UnboundedMaximum`], since the snapped
//! maximum does not fit in a finite pixel count.

use serde::{Deserialize, Serialize};

use crate::{DistributeError, Extent, PixelGrid, SpaceDistributor, Strategy};

fn default_scale() -> f64 {
    1.0
}

/// One distribution pass: the space to fill, the grid, and the children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRequest {
    pub available: f64,
    #[serde(default = "default_scale")]
    pub pixel_scale: f64,
    pub extents: Vec<Extent>,
    #[serde(default)]
    pub strategy: Strategy,
}

impl DistributionRequest {
    /// A grow request at scale 1.
    pub fn new(available: f64, extents: impl IntoIterator<Item = Extent>) -> Self {
        Self {
            available,
            pixel_scale: 1.0,
            extents: extents.into_iter().collect(),
            strategy: Strategy::Grow,
        }
    }

    /// Set the pixel scale.
    #[must_use]
    pub fn with_pixel_scale(mut self, pixel_scale: f64) -> Self {
        self.pixel_scale = pixel_scale;
        self
    }

    /// Set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Split the extents into the parallel arrays the solver takes.
    pub fn bounds(&self) -> (Vec<f64>, Vec<f64>) {
        self.extents.iter().map(|e| (e.min, e.max)).unzip()
    }

    /// Sum of the minimums.
    pub fn total_min(&self) -> f64 {
        self.extents.iter().map(|e| e.min).sum()
    }

    /// Sum of the maximums.
    pub fn total_max(&self) -> f64 {
        self.extents.iter().map(|e| e.max).sum()
    }

    /// The total the result should reach: `available` clamped to the
    /// reachable range.
    pub fn reachable_total(&self) -> f64 {
        self.available.max(self.total_min()).min(self.total_max())
    }

    /// The configured distributor.
    pub fn distributor(&self) -> SpaceDistributor {
        SpaceDistributor::new()
            .pixel_scale(self.pixel_scale)
            .strategy(self.strategy)
    }

    /// Check the preconditions without distributing.
    pub fn validate(&self) -> Result<(), DistributeError> {
        let (minimums, maximums) = self.bounds();
        crate::solver::validate(
            self.available,
            self.pixel_scale,
            &minimums,
            &maximums,
            self.strategy,
        )
        .map(|_| ())
    }

    /// Run the distribution.
    pub fn solve(&self) -> Result<Distribution, DistributeError> {
        let (minimums, maximums) = self.bounds();
        let sizes = self
            .distributor()
            .distribute(self.available, &minimums, &maximums)?;
        Ok(Distribution { sizes })
    }
}

/// Sizes produced for one request, in child order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Distribution {
    pub sizes: Vec<f64>,
}

impl Distribution {
    /// Number of children.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether there are no children.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Sum of all sizes.
    pub fn total(&self) -> f64 {
        self.sizes.iter().sum()
    }

    /// Sizes as whole device-pixel counts.
    pub fn pixel_sizes(&self, grid: PixelGrid) -> Vec<f64> {
        self.sizes.iter().map(|&s| grid.to_pixels(s)).collect()
    }

    /// Leading edge of each child when laid out back to back from `origin`.
    pub fn offsets(&self, origin: f64) -> Vec<f64> {
        self.sizes
            .iter()
            .scan(origin, |edge, &size| {
                let start = *edge;
                *edge += size;
                Some(start)
            })
            .collect()
    }
}
