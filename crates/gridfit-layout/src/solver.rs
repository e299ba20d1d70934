#![forbid(unsafe_code)]

//! Round-robin space distribution in device pixels.
//!
//! Every child owns a pixel range `[lo, hi]` derived from its logical
//! extent: the minimum is snapped up and the maximum snapped down, so any
//! pixel count inside the range maps back to a logical size within
//! `[min, max]`. A child whose range is empty (its extent straddles no grid
//! line) is pinned at its logical minimum and sits out the distribution.
//!
//! Whole pixels then move one at a time, in input order, one per eligible
//! child per round:
//!
//! - [`Strategy::Grow`] starts every child at `lo` and grants pixels until the
//!   budget or every child's `hi` is reached.
//! - [`Strategy::Shrink`] starts every child at `hi` and takes pixels back
//!   until the sum fits or every child is at `lo`.
//!
//! [`round_robin`] computes whole rounds at once; [`distribute_stepwise`]
//! keeps the unit-at-a-time loop as the reference it must match.

use gridfit_core::{PixelGrid, debug, trace_span};

use crate::{DistributeError, Strategy};

/// Pixel range of one participating child.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Lane {
    lo: f64,
    hi: f64,
}

impl Lane {
    fn capacity(self) -> f64 {
        if self.hi > self.lo {
            self.hi - self.lo
        } else {
            0.0
        }
    }
}

/// Everything the pixel loop needs, derived from a validated request.
#[derive(Debug)]
struct Plan {
    grid: PixelGrid,
    strategy: Strategy,
    /// `None` for pinned children.
    lanes: Vec<Option<Lane>>,
    /// Pixels to grant (grow) or take back (shrink).
    budget: f64,
}

impl Plan {
    fn new(
        available: f64,
        grid: PixelGrid,
        minimums: &[f64],
        maximums: &[f64],
        strategy: Strategy,
    ) -> Self {
        let mut pinned_space = 0.0;
        let mut pinned = 0usize;
        let lanes: Vec<Option<Lane>> = minimums
            .iter()
            .zip(maximums)
            .map(|(&min, &max)| {
                let lo = grid.to_pixels(grid.ceil(min));
                let hi = grid.to_pixels(grid.floor(max));
                if lo > hi {
                    pinned_space += min;
                    pinned += 1;
                    None
                } else {
                    Some(Lane { lo, hi })
                }
            })
            .collect();

        if pinned > 0 {
            debug!(pinned, "extents without a grid line pinned at their minimum");
        }

        let free = (available - pinned_space).max(0.0);
        let target_px = grid.to_pixels(grid.floor(free));
        let (sum_lo, sum_hi) = lanes
            .iter()
            .flatten()
            .fold((0.0, 0.0), |(lo, hi), lane| (lo + lane.lo, hi + lane.hi));

        let budget = match strategy {
            Strategy::Grow => {
                if target_px > sum_hi {
                    debug!(target_px, sum_hi, "available space exceeds every maximum");
                }
                (target_px.min(sum_hi) - sum_lo).max(0.0)
            }
            Strategy::Shrink => (sum_hi - target_px.max(sum_lo)).max(0.0),
        };

        Self {
            grid,
            strategy,
            lanes,
            budget,
        }
    }

    fn capacities(&self) -> Vec<f64> {
        self.lanes
            .iter()
            .map(|lane| lane.map_or(0.0, Lane::capacity))
            .collect()
    }

    /// Turn per-child pixel moves into logical sizes.
    fn finish(&self, moved: &[f64], minimums: &[f64], maximums: &[f64], out: &mut Vec<f64>) {
        out.clear();
        out.reserve(self.lanes.len());
        for (i, lane) in self.lanes.iter().enumerate() {
            let (min, max) = (minimums[i], maximums[i]);
            let size = match lane {
                None => min,
                Some(lane) => {
                    let pixels = match self.strategy {
                        Strategy::Grow => lane.lo + moved[i],
                        Strategy::Shrink => lane.hi - moved[i],
                    };
                    self.grid.from_pixels(pixels).clamp(min, max)
                }
            };
            out.push(size);
        }
    }
}

/// Check every precondition before any work is done.
pub(crate) fn validate(
    available: f64,
    pixel_scale: f64,
    minimums: &[f64],
    maximums: &[f64],
    strategy: Strategy,
) -> Result<PixelGrid, DistributeError> {
    let grid = PixelGrid::new(pixel_scale)
        .ok_or(DistributeError::InvalidPixelScale { scale: pixel_scale })?;
    if minimums.len() != maximums.len() {
        return Err(DistributeError::LengthMismatch {
            minimums: minimums.len(),
            maximums: maximums.len(),
        });
    }
    if available.is_nan() || available < 0.0 {
        return Err(DistributeError::InvalidAvailableSpace { available });
    }
    // Shrinking starts every child at its snapped maximum, so the starting
    // total must be finite in logical units and in pixels. Near f64::MAX the
    // snap itself saturates to infinity.
    let mut start = 0.0;
    let mut start_px = 0.0;
    for (index, (&min, &max)) in minimums.iter().zip(maximums).enumerate() {
        let usable = min.is_finite() && min >= 0.0 && !max.is_nan() && min <= max;
        if !usable {
            return Err(DistributeError::InvalidExtent { index, min, max });
        }
        if strategy == Strategy::Shrink {
            start += max;
            start_px += grid.to_pixels(grid.floor(max));
            if !(start.is_finite() && start_px.is_finite()) {
                return Err(DistributeError::UnboundedMaximum { index });
            }
        }
    }
    Ok(grid)
}

/// Distribute into caller-owned storage. Inputs must already be validated.
pub(crate) fn solve_into(
    available: f64,
    grid: PixelGrid,
    minimums: &[f64],
    maximums: &[f64],
    strategy: Strategy,
    out: &mut Vec<f64>,
) {
    let _span = trace_span!(
        "distribute",
        children = minimums.len(),
        available,
        scale = grid.scale(),
        ?strategy
    )
    .entered();

    out.clear();
    if minimums.is_empty() {
        return;
    }

    let plan = Plan::new(available, grid, minimums, maximums, strategy);
    let moved = round_robin(&plan.capacities(), plan.budget);
    plan.finish(&moved, minimums, maximums, out);
}

/// Hand out `units` whole pixels round-robin over children with spare
/// `capacity`, in input order, one per child per round.
///
/// Whole rounds are applied in bulk: while the budget covers a full round for
/// the smallest remaining capacity, every open child advances by that much at
/// once. The final partial round goes to the first open children in order.
fn round_robin(capacity: &[f64], mut units: f64) -> Vec<f64> {
    let mut moved = vec![0.0; capacity.len()];
    let mut open: Vec<usize> = (0..capacity.len()).filter(|&i| capacity[i] > 0.0).collect();

    while units > 0.0 && !open.is_empty() {
        let count = open.len() as f64;
        let step = open
            .iter()
            .map(|&i| capacity[i] - moved[i])
            .fold(f64::INFINITY, f64::min);

        if step.is_infinite() && units.is_infinite() {
            for &i in &open {
                moved[i] = f64::INFINITY;
            }
            break;
        }

        if step.is_finite() && units >= step * count {
            for &i in &open {
                moved[i] += step;
            }
            units -= step * count;
            open.retain(|&i| capacity[i] - moved[i] > 0.0);
            continue;
        }

        let extra = units % count;
        let rounds = (units - extra) / count;
        for (k, &i) in open.iter().enumerate() {
            moved[i] += rounds + if (k as f64) < extra { 1.0 } else { 0.0 };
        }
        break;
    }

    moved
}

/// Unit-at-a-time reference for [`round_robin`].
fn round_robin_stepwise(capacity: &[f64], mut units: f64) -> Vec<f64> {
    let mut moved = vec![0.0; capacity.len()];
    while units > 0.0 {
        let mut progressed = false;
        for (i, &cap) in capacity.iter().enumerate() {
            if units <= 0.0 {
                break;
            }
            if moved[i] < cap {
                moved[i] += 1.0;
                units -= 1.0;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    moved
}

/// Distribute one pixel at a time, exactly as the round-robin rule reads.
///
/// Produces results identical to [`crate::distribute`] and
/// [`crate::SpaceDistributor::distribute`], at a cost proportional to the
/// number of pixels moved. Kept for verification; layout code should use the
/// batched entry points.
///
/// Requires every child's pixel range to be finite, since the loop visits
/// each pixel.
pub fn distribute_stepwise(
    available: f64,
    pixel_scale: f64,
    minimums: &[f64],
    maximums: &[f64],
    strategy: Strategy,
) -> Result<Vec<f64>, DistributeError> {
    let grid = validate(available, pixel_scale, minimums, maximums, strategy)?;
    let mut out = Vec::with_capacity(minimums.len());
    if minimums.is_empty() {
        return Ok(out);
    }

    let plan = Plan::new(available, grid, minimums, maximums, strategy);
    let capacity = plan.capacities();
    if let Some(index) = capacity.iter().position(|cap| !cap.is_finite()) {
        return Err(DistributeError::UnboundedMaximum { index });
    }
    let total: f64 = capacity.iter().sum();
    let moved = round_robin_stepwise(&capacity, plan.budget.min(total));
    plan.finish(&moved, minimums, maximums, &mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grow(available: f64, scale: f64, mins: &[f64], maxs: &[f64]) -> Vec<f64> {
        let grid = validate(available, scale, mins, maxs, Strategy::Grow).unwrap();
        let mut out = Vec::new();
        solve_into(available, grid, mins, maxs, Strategy::Grow, &mut out);
        out
    }

    #[test]
    fn round_robin_grants_in_input_order() {
        assert_eq!(round_robin(&[5.0, 5.0, 5.0], 4.0), vec![2.0, 1.0, 1.0]);
        assert_eq!(round_robin(&[5.0, 5.0, 5.0], 2.0), vec![1.0, 1.0, 0.0]);
        assert_eq!(round_robin(&[1.0, 5.0, 5.0], 5.0), vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn round_robin_skips_full_children() {
        assert_eq!(round_robin(&[0.0, 3.0, 1.0], 3.0), vec![0.0, 2.0, 1.0]);
        assert_eq!(round_robin(&[2.0, 3.0], 100.0), vec![2.0, 3.0]);
    }

    #[test]
    fn round_robin_saturates_infinite_capacity() {
        let moved = round_robin(&[3.0, f64::INFINITY], f64::INFINITY);
        assert_eq!(moved, vec![3.0, f64::INFINITY]);
        let moved = round_robin(&[3.0, f64::INFINITY], 10.0);
        assert_eq!(moved, vec![3.0, 7.0]);
    }

    #[test]
    fn batched_matches_stepwise() {
        let capacities: [&[f64]; 5] = [
            &[1.0, 2.0, 3.0],
            &[0.0, 0.0, 4.0],
            &[7.0, 7.0, 7.0, 7.0],
            &[9.0, 1.0, 4.0, 0.0, 2.0],
            &[3.0],
        ];
        for capacity in capacities {
            let total: f64 = capacity.iter().sum();
            for units in 0..=(total as u32 + 2) {
                let units = f64::from(units);
                assert_eq!(
                    round_robin(capacity, units),
                    round_robin_stepwise(capacity, units),
                    "capacity={capacity:?} units={units}"
                );
            }
        }
    }

    #[test]
    fn extent_without_grid_line_is_pinned() {
        let sizes = grow(10.0, 1.0, &[2.3, 1.0], &[2.6, 20.0]);
        assert_eq!(sizes, vec![2.3, 7.0]);
    }

    #[test]
    fn bounds_snap_inward() {
        // min 1.2 -> 2px, max 4.7 -> 4px
        assert_eq!(grow(0.0, 1.0, &[1.2], &[4.7]), vec![2.0]);
        assert_eq!(grow(100.0, 1.0, &[1.2], &[4.7]), vec![4.0]);
    }

    #[test]
    fn fractional_budget_is_floored() {
        assert_eq!(grow(5.9, 1.0, &[0.0, 0.0], &[10.0, 10.0]), vec![3.0, 2.0]);
        let sizes = grow(1.0, 1.5, &[0.0, 0.0], &[10.0, 10.0]);
        assert_eq!(sizes, vec![1.0 / 1.5, 0.0]);
    }

    #[test]
    fn shrink_takes_from_first_child_first() {
        let grid = validate(7.0, 1.0, &[1.0, 1.0], &[4.0, 4.0], Strategy::Shrink).unwrap();
        let mut out = Vec::new();
        solve_into(7.0, grid, &[1.0, 1.0], &[4.0, 4.0], Strategy::Shrink, &mut out);
        assert_eq!(out, vec![3.0, 4.0]);
    }

    #[test]
    fn shrink_rejects_maximums_that_snap_to_infinity() {
        let mins = [0.0, 0.0];
        let maxs = [f64::MAX, f64::MAX];
        for scale in [1.0, 1.5, 2.0] {
            assert_eq!(
                validate(1e308, scale, &mins, &maxs, Strategy::Shrink),
                Err(DistributeError::UnboundedMaximum { index: 0 })
            );
        }
        assert!(validate(1e308, 1.0, &mins, &maxs, Strategy::Grow).is_ok());

        // Each maximum is fine on its own; their starting total is not.
        let maxs = [1e308, 1e308];
        assert_eq!(
            validate(0.0, 1.0, &mins, &maxs, Strategy::Shrink),
            Err(DistributeError::UnboundedMaximum { index: 1 })
        );
        assert_eq!(
            validate(0.0, 2.0, &[0.0], &[1e308], Strategy::Shrink),
            Err(DistributeError::UnboundedMaximum { index: 0 })
        );
    }

    #[test]
    fn huge_finite_maximums_never_produce_nan() {
        let mins = [0.0, 3.0, 0.0];
        let maxs = [1e300, 5.0, 1e300];
        for strategy in [Strategy::Grow, Strategy::Shrink] {
            for available in [0.0, 100.0, 1e300, 1e308, f64::INFINITY] {
                let grid = validate(available, 1.0, &mins, &maxs, strategy).unwrap();
                let mut out = Vec::new();
                solve_into(available, grid, &mins, &maxs, strategy, &mut out);
                for (i, &size) in out.iter().enumerate() {
                    assert!(
                        mins[i] <= size && size <= maxs[i],
                        "{strategy:?} available={available}: {out:?}"
                    );
                }
            }
        }
        let saturated = grow(1e308, 1.0, &[0.0, 0.0], &[f64::MAX, f64::MAX]);
        assert!(saturated.iter().all(|s| s.is_finite()), "{saturated:?}");
        assert_eq!(saturated.iter().sum::<f64>(), 1e308);
    }

    #[test]
    fn stepwise_rejects_unbounded_ranges() {
        let err = distribute_stepwise(10.0, 1.0, &[0.0, 0.0], &[5.0, f64::INFINITY], Strategy::Grow)
            .unwrap_err();
        assert_eq!(err, DistributeError::UnboundedMaximum { index: 1 });
    }

    #[test]
    fn validate_reports_first_problem() {
        assert_eq!(
            validate(1.0, 0.0, &[], &[], Strategy::Grow),
            Err(DistributeError::InvalidPixelScale { scale: 0.0 })
        );
        assert_eq!(
            validate(1.0, 1.0, &[1.0], &[], Strategy::Grow),
            Err(DistributeError::LengthMismatch {
                minimums: 1,
                maximums: 0
            })
        );
        assert_eq!(
            validate(-1.0, 1.0, &[], &[], Strategy::Grow),
            Err(DistributeError::InvalidAvailableSpace { available: -1.0 })
        );
        assert_eq!(
            validate(1.0, 1.0, &[0.0, 3.0], &[1.0, 2.0], Strategy::Grow),
            Err(DistributeError::InvalidExtent {
                index: 1,
                min: 3.0,
                max: 2.0
            })
        );
        assert_eq!(
            validate(1.0, 1.5, &[0.0], &[f64::MAX], Strategy::Shrink),
            Err(DistributeError::UnboundedMaximum { index: 0 })
        );
        assert!(validate(f64::INFINITY, 1.0, &[0.0], &[f64::INFINITY], Strategy::Grow).is_ok());
    }
}
