//! Input events from the canvas surface and the control widgets.
//!
//! Mouse and touch both arrive as [`PointerEvent`]s; the contact count
//! tells them apart where it matters (multi-touch never drags).

use super::controls::RotateAction;
use super::coords::{CanvasSize, ClientRect, Point};
use super::joystick::Direction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub source: PointerSource,
    #[serde(default)]
    pub client_x: f64,
    #[serde(default)]
    pub client_y: f64,
    /// Canvas bounding rect at the time of the event. Missing means the
    /// canvas is shown at its native size at the client origin.
    #[serde(default)]
    pub rect: Option<ClientRect>,
    /// Simultaneous contacts; always 1 for a mouse.
    #[serde(default = "one")]
    pub contacts: u32,
}

fn one() -> u32 { 1 }

impl PointerEvent {
    pub fn mouse(phase: PointerPhase, client_x: f64, client_y: f64, rect: ClientRect) -> Self {
        Self {
            phase,
            source: PointerSource::Mouse,
            client_x,
            client_y,
            rect: Some(rect),
            contacts: 1,
        }
    }

    pub fn touch(
        phase: PointerPhase,
        client_x: f64,
        client_y: f64,
        rect: ClientRect,
        contacts: u32,
    ) -> Self {
        Self {
            phase,
            source: PointerSource::Touch,
            client_x,
            client_y,
            rect: Some(rect),
            contacts,
        }
    }

    pub fn canvas_point(&self, canvas: CanvasSize) -> Point {
        let rect = self.rect.unwrap_or(ClientRect {
            left: 0.0,
            top: 0.0,
            width: canvas.w(),
            height: canvas.h(),
        });
        super::coords::to_canvas_point(Point::new(self.client_x, self.client_y), rect, canvas)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Pointer(PointerEvent),
    Zoom { value: f64 },
    Rotate { action: RotateAction },
    JoystickPress { direction: Direction },
    JoystickRelease { direction: Direction },
    JoystickCenter,
}
