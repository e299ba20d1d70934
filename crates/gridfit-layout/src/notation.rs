#![forbid(unsafe_code)]

//! ASCII notation for extents and distributions.
//!
//! Makes distribution tables readable at a glance. Each character is one
//! device pixel.
//!
//! **Extents.** A child starts with an uppercase letter. The letter and the
//! dots that follow it up to `[` form the minimum; the bracketed run,
//! brackets included, is the extra room up to the maximum:
//!
//! ```text
//! A.[.]B.....[......]C....[..]
//! A: min 2, max 5    B: min 6, max 14    C: min 5, max 9
//! ```
//!
//! A child without brackets is fixed at its minimum.
//!
//! **Sizes.** Each child renders as its letter followed by `-` until its
//! pixel width is reached, so the string length is the total width:
//!
//! ```text
//! A---B------C-----     A: 4, B: 7, C: 6
//! ```
//!
//! Children narrower than one pixel render as nothing.
//!
//! Runs longer than [`MAX_RUN`] pixels (including unbounded ones) are elided
//! as `…`, so huge extents render in bounded time. Elided output is for
//! reading only; [`parse`] rejects it.

use std::fmt;

use gridfit_core::PixelGrid;

use crate::Extent;

/// Longest run of `-` or `.` drawn before eliding.
pub const MAX_RUN: usize = 256;

/// Push `pixels` copies of `ch`, or `…` when the run is too long to draw.
fn push_run(out: &mut String, ch: char, pixels: f64) {
    if pixels <= MAX_RUN as f64 {
        for _ in 0..pixels as usize {
            out.push(ch);
        }
    } else {
        out.push('…');
    }
}

/// Failure to read an extent pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotationError {
    /// A character outside the notation, at byte offset `at`.
    UnexpectedChar { ch: char, at: usize },
    /// A `[` opened without a child letter before it.
    BracketWithoutChild { at: usize },
    /// A `[` inside another bracket, or a second bracket for the same child.
    NestedBracket { at: usize },
    /// A `]` with no matching `[`.
    UnmatchedClose { at: usize },
    /// The pattern ended inside a bracket.
    UnclosedBracket,
    /// More than 26 children.
    TooManyChildren,
}

impl fmt::Display for NotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedChar { ch, at } => write!(f, "unexpected {ch:?} at {at}"),
            Self::BracketWithoutChild { at } => write!(f, "'[' at {at} has no child letter"),
            Self::NestedBracket { at } => write!(f, "'[' at {at} opens a second bracket"),
            Self::UnmatchedClose { at } => write!(f, "']' at {at} closes nothing"),
            Self::UnclosedBracket => write!(f, "pattern ends inside a bracket"),
            Self::TooManyChildren => write!(f, "notation supports at most 26 children"),
        }
    }
}

impl std::error::Error for NotationError {}

#[derive(Debug, Default)]
struct Child {
    min: u32,
    extra: u32,
    opened: bool,
    closed: bool,
}

/// Read the extents of a pattern at the given grid.
///
/// Pixel counts are converted to logical units with `grid`, so the same
/// pattern describes the same device-pixel layout at every scale.
pub fn parse(pattern: &str, grid: PixelGrid) -> Result<Vec<Extent>, NotationError> {
    let mut children: Vec<Child> = Vec::new();

    for (at, ch) in pattern.char_indices() {
        match ch {
            'A'..='Z' => {
                if let Some(last) = children.last()
                    && last.opened
                    && !last.closed
                {
                    return Err(NotationError::UnexpectedChar { ch, at });
                }
                if children.len() == 26 {
                    return Err(NotationError::TooManyChildren);
                }
                children.push(Child {
                    min: 1,
                    ..Child::default()
                });
            }
            '.' => {
                let child = children
                    .last_mut()
                    .ok_or(NotationError::UnexpectedChar { ch, at })?;
                if child.closed {
                    return Err(NotationError::UnexpectedChar { ch, at });
                }
                if child.opened {
                    child.extra += 1;
                } else {
                    child.min += 1;
                }
            }
            '[' => {
                let child = children
                    .last_mut()
                    .ok_or(NotationError::BracketWithoutChild { at })?;
                if child.opened {
                    return Err(NotationError::NestedBracket { at });
                }
                child.opened = true;
                child.extra += 1;
            }
            ']' => {
                let child = children
                    .last_mut()
                    .filter(|c| c.opened && !c.closed)
                    .ok_or(NotationError::UnmatchedClose { at })?;
                child.closed = true;
                child.extra += 1;
            }
            _ => return Err(NotationError::UnexpectedChar { ch, at }),
        }
    }

    if children.iter().any(|c| c.opened && !c.closed) {
        return Err(NotationError::UnclosedBracket);
    }

    Ok(children
        .iter()
        .map(|c| {
            let min = grid.from_pixels(f64::from(c.min));
            let max = grid.from_pixels(f64::from(c.min + c.extra));
            Extent::new(min, max)
        })
        .collect())
}

/// Draw sizes as letters and dashes, one character per device pixel.
pub fn render(sizes: &[f64], grid: PixelGrid) -> String {
    let mut out = String::new();
    for (letter, &size) in ('A'..='Z').zip(sizes) {
        let pixels = grid.to_pixels(size);
        if pixels < 1.0 {
            continue;
        }
        out.push(letter);
        push_run(&mut out, '-', pixels - 1.0);
    }
    out
}

/// Draw extents in the pattern syntax accepted by [`parse`].
///
/// Meant for diagnostics. Two cases have no exact spelling: unbounded
/// maximums render as an empty bracket (`[]`), and a single pixel of extra
/// room renders as a lone `[` that [`parse`] rejects.
pub fn render_extents(extents: &[Extent], grid: PixelGrid) -> String {
    let mut out = String::new();
    for (letter, extent) in ('A'..='Z').zip(extents) {
        let min = grid.to_pixels(extent.min).max(1.0);
        let max = grid.to_pixels(extent.max);
        out.push(letter);
        push_run(&mut out, '.', min - 1.0);
        if !max.is_finite() {
            out.push_str("[]");
        } else if max > min {
            let extra = max - min;
            out.push('[');
            if extra >= 2.0 {
                push_run(&mut out, '.', extra - 2.0);
                out.push(']');
            }
        }
    }
    out
}
