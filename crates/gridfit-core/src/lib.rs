#![forbid(unsafe_code)]

//! Core: device-pixel grid arithmetic and the logging facade.
//!
//! # Role in gridfit
//! `gridfit-core` owns the numeric primitives every layout pass leans on:
//! snapping logical coordinates onto the device-pixel grid of a (possibly
//! fractional) output scale without drift, overflow, or NaN.
//!
//! # Primary responsibilities
//! - **scaled_math**: `ceil`, `floor` and `rint` onto the grid of a scale.
//! - **PixelGrid**: a validated scale with snapping helpers.
//! - **logging**: `tracing` macros when the `tracing` feature is on, no-ops
//!   otherwise.
//!
//! # How it fits in the system
//! `gridfit-layout` builds its space distributor on these primitives; layout
//! callers can use them directly to snap positions and insets.

pub mod logging;
pub mod pixel_grid;
pub mod scaled_math;

pub use pixel_grid::PixelGrid;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
