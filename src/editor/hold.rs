//! Hold-to-rotate clock
//! Two periodic ticks driven by `advance(dt)`: one rotates, one accelerates the step.

use std::time::Duration;

use crate::plan::DoorKind;

pub const ROTATE_TICK: Duration = Duration::from_millis(30);
pub const ACCEL_TICK: Duration = Duration::from_millis(180);
pub const STEP_START: i32 = 3;
pub const STEP_GROWTH: i32 = 3;
pub const STEP_MAX: i32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateTarget {
    Machine(u32),
    Door(DoorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    /// Counter-clockwise
    Left,
    /// Clockwise
    Right,
}

impl RotateDirection {
    pub fn sign(&self) -> i32 {
        match self {
            RotateDirection::Left => -1,
            RotateDirection::Right => 1,
        }
    }
}

/// An active press-and-hold on a rotate button
#[derive(Debug, Clone, PartialEq)]
pub struct HoldRotate {
    pub target: RotateTarget,
    pub direction: RotateDirection,
    pub step: i32,
    since_rotate: Duration,
    since_accel: Duration,
}

impl HoldRotate {
    pub fn new(target: RotateTarget, direction: RotateDirection) -> Self {
        Self {
            target,
            direction,
            step: STEP_START,
            since_rotate: Duration::ZERO,
            since_accel: Duration::ZERO,
        }
    }

    /// Signed rotation for the current step
    pub fn delta(&self) -> i32 {
        self.direction.sign() * self.step
    }

    /// Run both timers forward by `dt` and return the rotation applied by each rotate
    /// tick that fired, in order. When both timers fire on the same instant the rotate
    /// tick runs before the step grows.
    pub fn advance(&mut self, dt: Duration) -> Vec<i32> {
        let mut deltas = Vec::new();
        let mut remaining = dt;

        loop {
            let to_rotate = ROTATE_TICK - self.since_rotate;
            let to_accel = ACCEL_TICK - self.since_accel;
            let next = to_rotate.min(to_accel);
            if next > remaining {
                self.since_rotate += remaining;
                self.since_accel += remaining;
                break;
            }

            remaining -= next;
            self.since_rotate += next;
            self.since_accel += next;

            if self.since_rotate >= ROTATE_TICK {
                self.since_rotate = Duration::ZERO;
                deltas.push(self.delta());
            }
            if self.since_accel >= ACCEL_TICK {
                self.since_accel = Duration::ZERO;
                self.step = (self.step + STEP_GROWTH).min(STEP_MAX);
            }
        }

        deltas
    }
}
