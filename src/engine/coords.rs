//! Client space ↔ canvas space mapping.
//!
//! The canvas element can be displayed at a CSS size different from its
//! pixel buffer, so every pointer position is rescaled before it touches the
//! transform state.

use serde::{Deserialize, Serialize};

/// Nominal pixel size of the canvas buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn w(&self) -> f64 {
        self.width as f64
    }

    pub fn h(&self) -> f64 {
        self.height as f64
    }
}

/// On-screen bounding rectangle of the canvas element, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

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

impl ClientRect {
    /// Canvas pixels per client pixel on each axis.
    /// A collapsed rect maps 1:1 rather than dividing by zero.
    fn scale_factors(&self, canvas: CanvasSize) -> (f64, f64) {
        let sx = if self.width > 0.0 { canvas.w() / self.width } else { 1.0 };
        let sy = if self.height > 0.0 { canvas.h() / self.height } else { 1.0 };
        (sx, sy)
    }
}

/// Map a client-space point into canvas space.
pub fn to_canvas_point(client: Point, rect: ClientRect, canvas: CanvasSize) -> Point {
    let (sx, sy) = rect.scale_factors(canvas);
    Point {
        x: (client.x - rect.left) * sx,
        y: (client.y - rect.top) * sy,
    }
}

/// Inverse of [`to_canvas_point`].
pub fn to_client_point(canvas_pt: Point, rect: ClientRect, canvas: CanvasSize) -> Point {
    let (sx, sy) = rect.scale_factors(canvas);
    Point {
        x: canvas_pt.x / sx + rect.left,
        y: canvas_pt.y / sy + rect.top,
    }
}
