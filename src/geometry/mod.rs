//! Geometry and grid helpers
//! Clamping, grid snapping, rotation normalization and rectangle overlap

use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Grid unit every committed coordinate and size is rounded to
pub const GRID: f64 = 10.0;

/// A point in logical (unzoomed) stage coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in logical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Inclusive containment, so clicks on a border still hit
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// Screen-space origin of the stage element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StageRect {
    pub left: f64,
    pub top: f64,
}

pub fn clamp(v: f64, min: f64, max: f64) -> f64 {
    // `f64::clamp` panics when min > max; an entity larger than the stage pins to min.
    if max < min || v < min {
        return min;
    }
    if v > max {
        return max;
    }
    v
}

/// Round to the nearest grid line (halves round away from zero)
pub fn snap(v: f64) -> f64 {
    // `+ 0.0` folds -0.0 so it never reaches the JSON payload
    (v / GRID).round() * GRID + 0.0
}

/// Largest grid line not above `v`
pub fn snap_down(v: f64) -> f64 {
    (v / GRID).floor() * GRID + 0.0
}

/// Smallest grid line not below `v`
pub fn snap_up(v: f64) -> f64 {
    (v / GRID).ceil() * GRID + 0.0
}

/// Snap then clamp into `[min, max]`, pulling `max` down to a grid line so the result
/// is both on the grid and inside the bounds.
pub fn snap_within(v: f64, min: f64, max: f64) -> f64 {
    clamp(snap(v), min, snap_down(max))
}

/// Fold any integer angle into `[0, 360)`
pub fn normalize_rotation(r: i32) -> i32 {
    r.rem_euclid(360)
}

/// Strict AABB intersection; shared edges do not count
pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Convert pointer client coordinates into logical stage coordinates
pub fn to_logical(client: Point, stage: StageRect, zoom: f64) -> Point {
    Point::new((client.x - stage.left) / zoom, (client.y - stage.top) / zoom)
}

/// Grid line the raw value would snap to, if it is close enough to show a guide
pub fn guide_for(raw: f64, threshold: f64) -> Option<f64> {
    let line = snap(raw);
    ((raw - line).abs() <= threshold).then_some(line)
}
