#![no_main]

use gridfit_layout::notation::{MAX_RUN, parse, render, render_extents};
use gridfit_layout::{PixelGrid, distribute};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(pattern) = std::str::from_utf8(data) else {
        return;
    };
    // Longer patterns could hold runs that render elided.
    if pattern.len() > MAX_RUN {
        return;
    }

    // Parsing must never panic.
    let Ok(extents) = parse(pattern, PixelGrid::UNIT) else {
        return;
    };

    // Every accepted pattern draws back to itself.
    assert_eq!(render_extents(&extents, PixelGrid::UNIT), pattern);

    // Growing into the total maximum reaches every maximum.
    let (mins, maxs): (Vec<f64>, Vec<f64>) = extents.iter().map(|e| (e.min, e.max)).unzip();
    let upper: f64 = maxs.iter().sum();
    let sizes = distribute(upper, 1.0, &mins, &maxs).unwrap();
    assert_eq!(sizes, maxs);
    assert_eq!(render(&sizes, PixelGrid::UNIT).len() as f64, upper);
});
