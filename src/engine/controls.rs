use super::transform::TransformState;
use serde::{Deserialize, Serialize};

/// Bounds of the zoom slider. Configuration for the front end; the core
/// accepts whatever value the slider reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RotateAction {
    /// +90°, wrapping at 360.
    Step,
    /// Jump straight to an angle.
    Absolute { degrees: f64 },
}

pub const ROTATE_STEP_DEG: f64 = 90.0;

/// Apply a slider value. Non-finite or non-positive values are dropped so
/// the scale stays positive.
pub fn apply_zoom(transform: &mut TransformState, value: f64) -> bool {
    let applied = transform.set_scale(value);
    if !applied {
        log::debug!("Ignoring zoom value {}", value);
    }
    applied
}

pub fn apply_rotate(transform: &mut TransformState, action: RotateAction) {
    match action {
        RotateAction::Step => transform.rotate_by(ROTATE_STEP_DEG),
        RotateAction::Absolute { degrees } => transform.set_rotation(degrees),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_cycles_through_quarter_turns() {
        let mut t = TransformState::default();
        let mut seen = Vec::new();
        for _ in 0..5 {
            apply_rotate(&mut t, RotateAction::Step);
            seen.push(t.rotation_deg);
        }
        assert_eq!(seen, vec![90.0, 180.0, 270.0, 0.0, 90.0]);
    }

    #[test]
    fn test_absolute_angle_is_normalized() {
        let mut t = TransformState::default();
        apply_rotate(&mut t, RotateAction::Absolute { degrees: 180.0 });
        assert_eq!(t.rotation_deg, 180.0);
        apply_rotate(&mut t, RotateAction::Absolute { degrees: -90.0 });
        assert_eq!(t.rotation_deg, 270.0);
        apply_rotate(&mut t, RotateAction::Absolute { degrees: 360.0 });
        assert_eq!(t.rotation_deg, 0.0);
    }

    #[test]
    fn test_zoom_assigns_value() {
        let mut t = TransformState::default();
        assert!(apply_zoom(&mut t, 2.5));
        assert_eq!(t.scale, 2.5);
        assert!(!apply_zoom(&mut t, 0.0));
        assert_eq!(t.scale, 2.5);
    }

    #[test]
    fn test_rotate_action_wire_format() {
        let step: RotateAction = serde_json::from_str(r#"{"type":"step"}"#).unwrap();
        assert_eq!(step, RotateAction::Step);
        let abs: RotateAction =
            serde_json::from_str(r#"{"type":"absolute","degrees":270}"#).unwrap();
        assert_eq!(abs, RotateAction::Absolute { degrees: 270.0 });
    }
}
