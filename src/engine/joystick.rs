//! Directional pad that nudges the media while a direction is held.

use super::coords::CanvasSize;
use super::scheduler::TaskHandle;
use super::transform::TransformState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedMultiplier {
    X1,
    X2,
    X4,
}

impl SpeedMultiplier {
    pub fn factor(&self) -> f64 {
        match self {
            SpeedMultiplier::X1 => 1.0,
            SpeedMultiplier::X2 => 2.0,
            SpeedMultiplier::X4 => 4.0,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SpeedMultiplier::X1 => SpeedMultiplier::X2,
            SpeedMultiplier::X2 => SpeedMultiplier::X4,
            SpeedMultiplier::X4 => SpeedMultiplier::X1,
        }
    }

    /// Text shown on the center control.
    pub fn label(&self) -> &'static str {
        match self {
            SpeedMultiplier::X1 => "●",
            SpeedMultiplier::X2 => "●●",
            SpeedMultiplier::X4 => "●●●",
        }
    }
}

impl Default for SpeedMultiplier {
    fn default() -> Self {
        SpeedMultiplier::X1
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickTuning {
    /// Pixels per refresh at speed ×1.
    pub base_speed: f64,
    /// Minimum strip of media kept on canvas.
    pub pad: f64,
}

impl Default for JoystickTuning {
    fn default() -> Self {
        Self {
            base_speed: 2.0,
            pad: 80.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct JoystickState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub speed: SpeedMultiplier,
    /// Running motion task, if any.
    pub animation: Option<TaskHandle>,
}

impl JoystickState {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn any_held(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    pub fn cycle_speed(&mut self) -> SpeedMultiplier {
        self.speed = self.speed.next();
        self.speed
    }

    /// Per-axis displacement for one refresh; opposite directions cancel.
    pub fn velocity(&self, base_speed: f64) -> (f64, f64) {
        let v = base_speed * self.speed.factor();
        let mut dx = 0.0;
        let mut dy = 0.0;
        if self.up {
            dy -= v;
        }
        if self.down {
            dy += v;
        }
        if self.left {
            dx -= v;
        }
        if self.right {
            dx += v;
        }
        (dx, dy)
    }

    /// Move one step and soft-clamp so at least `pad` pixels stay visible.
    pub fn step(
        &self,
        transform: &mut TransformState,
        natural: (u32, u32),
        canvas: CanvasSize,
        tuning: JoystickTuning,
    ) {
        let (dx, dy) = self.velocity(tuning.base_speed);
        transform.translate(dx, dy);

        let (w, h) = natural;
        if w == 0 || h == 0 {
            return;
        }
        let (dw, dh) = transform.displayed_size(w, h);
        let pad = tuning.pad;
        transform.pos_x = soft_clamp(transform.pos_x, -dw + pad, canvas.w() - pad);
        transform.pos_y = soft_clamp(transform.pos_y, -dh + pad, canvas.h() - pad);
    }
}

/// `min(max(v, lo), hi)`; unlike `f64::clamp` this never panics when the
/// range is inverted (tiny media).
fn soft_clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}
