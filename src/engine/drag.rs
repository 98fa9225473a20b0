//! Pointer / single-touch dragging of the media layer.

use super::coords::Point;
use super::transform::TransformState;

/// Offset between the grab point and the media position, captured on press.
/// Only exists while a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub anchor_x: f64,
    pub anchor_y: f64,
}

#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<DragSession> {
        self.session
    }

    /// Idle → Dragging. Needs exactly one contact point.
    pub fn press(&mut self, pointer: Point, contacts: u32, transform: &TransformState) -> bool {
        if contacts != 1 {
            return false;
        }
        self.session = Some(DragSession {
            anchor_x: pointer.x - transform.pos_x,
            anchor_y: pointer.y - transform.pos_y,
        });
        true
    }

    /// Dragging → Dragging. Position follows the pointer, unclamped.
    pub fn drag_to(&mut self, pointer: Point, contacts: u32, transform: &mut TransformState) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        if contacts != 1 {
            return false;
        }
        transform.pos_x = pointer.x - session.anchor_x;
        transform.pos_y = pointer.y - session.anchor_y;
        true
    }

    /// Dragging → Idle.
    pub fn release(&mut self) {
        self.session = None;
    }
}
