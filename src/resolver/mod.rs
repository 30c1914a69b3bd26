//! Machine overlap resolver
//! Expanding-radius search for a grid-aligned slot that clears every other machine

use crate::geometry::{rect_overlap, Rect, GRID};
use crate::plan::Stage;

#[cfg(test)]
mod tests;

/// Search stops after this many grid units of displacement
pub const MAX_RADIUS_STEPS: u32 = 14;

/// Direction multipliers tried at each radius: E, W, S, N, then the diagonals
const DIRECTIONS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
];

/// Outcome of a placement attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub rect: Rect,
    /// `false` when the search ran out and `rect` may still overlap
    pub clear: bool,
}

fn overlaps_any(rect: &Rect, others: &[Rect]) -> bool {
    others.iter().any(|other| rect_overlap(rect, other))
}

/// Find a spot for `candidate` (already snapped and clamped) that overlaps none of
/// `others`. When nothing within the radius cap is free, the last candidate tried is
/// returned with `clear == false`.
pub fn resolve(candidate: Rect, others: &[Rect], stage: &Stage) -> Resolution {
    if !overlaps_any(&candidate, others) {
        return Resolution {
            rect: candidate,
            clear: true,
        };
    }

    let mut last = candidate;
    for step in 1..=MAX_RADIUS_STEPS {
        let radius = f64::from(step) * GRID;
        for (dx, dy) in DIRECTIONS {
            let moved = stage.place_box(
                candidate.with_origin(candidate.x + dx * radius, candidate.y + dy * radius),
            );
            if !overlaps_any(&moved, others) {
                return Resolution {
                    rect: moved,
                    clear: true,
                };
            }
            last = moved;
        }
    }

    log::warn!(
        "no free slot within {} units of ({}, {}); keeping overlapping placement at ({}, {})",
        f64::from(MAX_RADIUS_STEPS) * GRID,
        candidate.x,
        candidate.y,
        last.x,
        last.y
    );
    Resolution {
        rect: last,
        clear: false,
    }
}
