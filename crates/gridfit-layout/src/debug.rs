#![forbid(unsafe_code)]

//! Distribution debugging utilities.
//!
//! Provides introspection into distribution passes:
//! - Recording of requests and the sizes they produced
//! - Detection of overflow (minimums exceed the space) and underflow
//!   (maximums leave space unused)
//! - Export to Graphviz DOT format
//!
//! # Feature Gating
//!
//! This module is always compiled (the types are useful for testing),
//! but recording is a no-op unless explicitly enabled at runtime.
//!
//! # Usage
//!
//! ```ignore
//! use gridfit_layout::debug::DistributionDebugger;
//!
//! let debugger = DistributionDebugger::new();
//! debugger.set_enabled(true);
//!
//! let sizes = debugger.solve("toolbar", &request)?;
//!
//! for record in debugger.snapshot() {
//!     println!("{}", record.summary());
//! }
//! ```

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::notation;
use crate::{DistributeError, Distribution, DistributionRequest, PixelGrid};

/// Share of the available space that may stay unused before a record counts
/// as underflowing.
const UNDERFLOW_THRESHOLD: f64 = 0.2;

/// A record of a single distribution pass.
#[derive(Debug, Clone)]
pub struct DistributionRecord {
    /// User-provided name for identification.
    pub name: String,
    /// The request that was solved.
    pub request: DistributionRequest,
    /// Computed size for each child.
    pub sizes: Vec<f64>,
    /// Time taken to solve (if measured).
    pub solve_time: Option<Duration>,
    /// Parent record index (for nested containers).
    pub parent_index: Option<usize>,
}

impl DistributionRecord {
    /// Create a record from a request and its result.
    pub fn new(name: impl Into<String>, request: DistributionRequest, sizes: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            request,
            sizes,
            solve_time: None,
            parent_index: None,
        }
    }

    fn total(&self) -> f64 {
        self.sizes.iter().sum()
    }

    /// One device pixel per child: the rounding slack the distributor may use.
    fn tolerance(&self) -> f64 {
        self.sizes.len() as f64 / self.request.pixel_scale
    }

    /// Check if the children need more than the available space.
    pub fn has_overflow(&self) -> bool {
        self.total() > self.request.available + self.tolerance()
    }

    /// Check if significant space remains unused (underflow).
    ///
    /// Returns true if more than 20% of finite available space is unused.
    pub fn has_underflow(&self) -> bool {
        let available = self.request.available;
        if !available.is_finite() || available <= 0.0 {
            return false;
        }
        let unused = (available - self.total()).max(0.0);
        unused / available > UNDERFLOW_THRESHOLD
    }

    /// Percentage of available space used, capped at 100.
    pub fn utilization(&self) -> f64 {
        let available = self.request.available;
        if available <= 0.0 {
            return 0.0;
        }
        if !available.is_finite() {
            return 0.0;
        }
        (self.total() / available).min(1.0) * 100.0
    }

    /// Generate a human-readable summary.
    pub fn summary(&self) -> String {
        let request = &self.request;
        let grid = PixelGrid::new(request.pixel_scale).unwrap_or_default();
        let mut s = String::new();
        let _ = writeln!(s, "{} ({:?}):", self.name, request.strategy);
        let _ = writeln!(
            s,
            "  Available: {} at scale {}",
            request.available, request.pixel_scale
        );
        let _ = writeln!(
            s,
            "  Extents: {}",
            notation::render_extents(&request.extents, grid)
        );
        let _ = writeln!(s, "  Sizes:   {}", notation::render(&self.sizes, grid));

        for (i, (extent, size)) in request.extents.iter().zip(&self.sizes).enumerate() {
            let _ = writeln!(s, "  [{i}] [{}, {}] -> {size}", extent.min, extent.max);
        }

        let _ = writeln!(s, "  Utilization: {:.1}%", self.utilization());
        if self.has_overflow() {
            let _ = writeln!(s, "  ⚠ OVERFLOW");
        }
        if self.has_underflow() {
            let _ = writeln!(s, "  ⚠ UNDERFLOW (>20% unused)");
        }
        if let Some(t) = self.solve_time {
            let _ = writeln!(s, "  Solve time: {:?}", t);
        }
        s
    }
}

/// Collects distribution records while enabled.
///
/// Shared by `Arc`; recording is thread-safe.
#[derive(Debug)]
pub struct DistributionDebugger {
    enabled: AtomicBool,
    records: Mutex<Vec<DistributionRecord>>,
}

impl DistributionDebugger {
    /// Create a new debugger wrapped in Arc (disabled by default).
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            enabled: AtomicBool::new(false),
            records: Mutex::new(Vec::new()),
        })
    }

    /// Check if debugging is enabled.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Enable or disable debugging.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Toggle debugging on/off. Returns the new state.
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::Relaxed)
    }

    /// Clear all recorded data.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }

    /// Record a distribution pass.
    pub fn record(&self, record: DistributionRecord) {
        if !self.enabled() {
            return;
        }
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    /// Solve `request`, recording the pass (with timing) when enabled.
    pub fn solve(
        &self,
        name: impl Into<String>,
        request: &DistributionRequest,
    ) -> Result<Distribution, DistributeError> {
        if !self.enabled() {
            return request.solve();
        }
        let start = Instant::now();
        let distribution = request.solve()?;
        let mut record =
            DistributionRecord::new(name, request.clone(), distribution.sizes.clone());
        record.solve_time = Some(start.elapsed());
        self.record(record);
        Ok(distribution)
    }

    /// Get a snapshot of all records.
    pub fn snapshot(&self) -> Vec<DistributionRecord> {
        self.records
            .lock()
            .ok()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Get records with overflow conditions.
    pub fn overflows(&self) -> Vec<DistributionRecord> {
        self.snapshot()
            .into_iter()
            .filter(|r| r.has_overflow())
            .collect()
    }

    /// Get records with underflow conditions.
    pub fn underflows(&self) -> Vec<DistributionRecord> {
        self.snapshot()
            .into_iter()
            .filter(|r| r.has_underflow())
            .collect()
    }

    /// Generate a summary report of all recorded passes.
    pub fn report(&self) -> String {
        let records = self.snapshot();

        let mut s = String::new();
        let _ = writeln!(s, "=== Distribution Debug Report ({}) ===", records.len());

        let overflows: Vec<_> = records.iter().filter(|r| r.has_overflow()).collect();
        let underflows: Vec<_> = records.iter().filter(|r| r.has_underflow()).collect();

        if !overflows.is_empty() {
            let _ = writeln!(s, "\n⚠ {} passes have OVERFLOW:", overflows.len());
            for r in &overflows {
                let _ = writeln!(s, "  - {}", r.name);
            }
        }

        if !underflows.is_empty() {
            let _ = writeln!(s, "\n⚠ {} passes have UNDERFLOW:", underflows.len());
            for r in &underflows {
                let _ = writeln!(s, "  - {} ({:.1}% utilization)", r.name, r.utilization());
            }
        }

        for record in &records {
            let _ = write!(s, "\n{}", record.summary());
        }

        s
    }

    /// Export to Graphviz DOT format for visualization.
    ///
    /// Each pass becomes a node, with edges for `parent_index` links.
    pub fn export_dot(&self) -> String {
        let records = self.snapshot();

        let mut s = String::new();
        let _ = writeln!(s, "digraph DistributionDebug {{");
        let _ = writeln!(s, "  rankdir=TB;");
        let _ = writeln!(s, "  node [shape=record];");

        for (i, r) in records.iter().enumerate() {
            let color = if r.has_overflow() {
                "red"
            } else if r.has_underflow() {
                "yellow"
            } else {
                "green"
            };

            let label = format!(
                "{}|{:?}|avail: {}|util: {:.0}%",
                r.name,
                r.request.strategy,
                r.request.available,
                r.utilization()
            );

            let _ = writeln!(s, "  n{i} [label=\"{{{label}}}\", color=\"{color}\"];");

            if let Some(parent) = r.parent_index {
                let _ = writeln!(s, "  n{parent} -> n{i};");
            }
        }

        let _ = writeln!(s, "}}");
        s
    }
}
