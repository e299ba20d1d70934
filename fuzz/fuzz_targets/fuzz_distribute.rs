#![no_main]

use arbitrary::Arbitrary;
use gridfit_layout::solver::distribute_stepwise;
use gridfit_layout::{PixelGrid, SpaceDistributor, Strategy};
use libfuzzer_sys::fuzz_target;

const SCALES: [f64; 8] = [1.0, 1.25, 1.5, 1.75, 2.0, 2.5, 4.0 / 3.0, 0.75];

#[derive(Debug, Arbitrary)]
struct Child {
    /// Minimum in hundredths of a logical unit.
    min: u16,
    extra: u16,
    unbounded: bool,
}

#[derive(Debug, Arbitrary)]
struct Input {
    available: u32,
    scale: u8,
    shrink: bool,
    children: Vec<Child>,
    /// Raw values fed straight in; must never panic.
    raw: (f64, f64, f64, f64),
}

fuzz_target!(|input: Input| {
    // Raw floats: any outcome is fine as long as nothing panics or goes NaN.
    let (available, scale, min, max) = input.raw;
    if let Ok(sizes) = gridfit_layout::distribute(available, scale, &[min], &[max]) {
        assert!(!sizes[0].is_nan(), "NaN from {:?}", input.raw);
    }

    if input.children.len() > 16 {
        return;
    }

    let scale = SCALES[usize::from(input.scale) % SCALES.len()];
    let grid = PixelGrid::new(scale).unwrap();
    let strategy = if input.shrink {
        Strategy::Shrink
    } else {
        Strategy::Grow
    };
    let available = f64::from(input.available % 100_000) / 100.0;

    let (mins, maxs): (Vec<f64>, Vec<f64>) = input
        .children
        .iter()
        .map(|c| {
            let min = f64::from(c.min) / 100.0;
            let max = if c.unbounded && strategy == Strategy::Grow {
                f64::INFINITY
            } else {
                min + f64::from(c.extra) / 100.0
            };
            (min, max)
        })
        .collect();

    let distributor = SpaceDistributor::new()
        .pixel_scale(scale)
        .strategy(strategy);
    let sizes = distributor.distribute(available, &mins, &maxs).unwrap();
    assert_eq!(sizes.len(), mins.len());

    for (i, &size) in sizes.iter().enumerate() {
        assert!(!size.is_nan(), "child {i} is NaN");
        assert!(
            mins[i] <= size && size <= maxs[i],
            "child {i}: {size} outside [{}, {}]",
            mins[i],
            maxs[i]
        );
    }

    let total: f64 = sizes.iter().sum();
    let lower: f64 = mins.iter().sum();
    let upper: f64 = maxs.iter().sum();
    let target = available.clamp(lower, upper);
    let tolerance = sizes.len() as f64 * grid.unit() + 1e-9 * target.max(1.0);
    assert!(
        (total - target).abs() <= tolerance,
        "total {total} target {target} at scale {scale}"
    );

    // Same input, same bits.
    let again = distributor.distribute(available, &mins, &maxs).unwrap();
    assert!(sizes.iter().zip(&again).all(|(a, b)| a.to_bits() == b.to_bits()));

    if maxs.iter().all(|m| m.is_finite()) {
        let stepwise = distribute_stepwise(available, scale, &mins, &maxs, strategy).unwrap();
        assert_eq!(sizes, stepwise, "batched and stepwise disagree");
    }
});
