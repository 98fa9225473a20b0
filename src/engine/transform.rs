use super::coords::CanvasSize;
use serde::{Deserialize, Serialize};

/// Placement of the media layer on the canvas.
///
/// `pos_x`/`pos_y` are the canvas-space top-left of the media's scaled,
/// unrotated bounding box. Rotation pivots around that box's center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformState {
    pub scale: f64,
    pub rotation_deg: f64,
    pub pos_x: f64,
    pub pos_y: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_deg: 0.0,
            pos_x: 0.0,
            pos_y: 0.0,
        }
    }
}

impl TransformState {
    /// "Cover" placement: the media fills the canvas with symmetric cropping.
    pub fn cover(natural_width: u32, natural_height: u32, canvas: CanvasSize) -> Self {
        let w = natural_width.max(1) as f64;
        let h = natural_height.max(1) as f64;
        let s = (canvas.w() / w).max(canvas.h() / h);
        Self {
            scale: s,
            rotation_deg: 0.0,
            pos_x: (canvas.w() - w * s) / 2.0,
            pos_y: (canvas.h() - h * s) / 2.0,
        }
    }

    /// Displayed (scaled) size of media with the given natural size.
    pub fn displayed_size(&self, natural_width: u32, natural_height: u32) -> (f64, f64) {
        (
            natural_width as f64 * self.scale,
            natural_height as f64 * self.scale,
        )
    }

    /// Center of the scaled bounding box; rotation happens around it.
    pub fn pivot(&self, natural_width: u32, natural_height: u32) -> (f64, f64) {
        let (dw, dh) = self.displayed_size(natural_width, natural_height);
        (self.pos_x + dw / 2.0, self.pos_y + dh / 2.0)
    }

    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        self.scale = scale;
        true
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation_deg = normalize_degrees(degrees);
    }

    pub fn rotate_by(&mut self, degrees: f64) {
        self.set_rotation(self.rotation_deg + degrees);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.pos_x += dx;
        self.pos_y += dy;
    }
}

/// Map any angle into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cover_landscape_into_4_3() {
        let t = TransformState::cover(1920, 1080, CanvasSize::new(800, 600));
        let expected = 600.0 / 1080.0;
        assert!((t.scale - expected).abs() < 1e-12);
        assert!((t.scale - 0.5556).abs() < 1e-4);
        assert!((t.pos_x - (800.0 - 1920.0 * expected) / 2.0).abs() < 1e-9);
        assert!((t.pos_x - -133.333).abs() < 1e-2);
        assert_eq!(t.pos_y, 0.0);
        assert_eq!(t.rotation_deg, 0.0);
    }

    #[test]
    fn test_cover_unknown_size_uses_one_pixel() {
        let t = TransformState::cover(0, 0, CanvasSize::new(800, 600));
        assert_eq!(t.scale, 800.0);
        assert!(t.scale.is_finite());
        assert_eq!(t.pos_x, 0.0);
        assert_eq!(t.pos_y, (600.0 - 800.0) / 2.0);
    }

    #[test]
    fn test_pivot_is_center_of_scaled_box() {
        let t = TransformState { scale: 2.0, rotation_deg: 0.0, pos_x: 10.0, pos_y: 20.0 };
        assert_eq!(t.pivot(100, 50), (110.0, 70.0));
    }

    #[test]
    fn test_scale_rejects_non_positive() {
        let mut t = TransformState::default();
        assert!(!t.set_scale(0.0));
        assert!(!t.set_scale(-1.0));
        assert!(!t.set_scale(f64::NAN));
        assert_eq!(t.scale, 1.0);
        assert!(t.set_scale(0.25));
        assert_eq!(t.scale, 0.25);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(450.0), 90.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(f64::INFINITY), 0.0);
        let tiny = normalize_degrees(-1e-20);
        assert!((0.0..360.0).contains(&tiny));
    }

    proptest! {
        #[test]
        fn test_cover_fills_and_centers(
            w in 1u32..10_000,
            h in 1u32..10_000,
            cw in 1u32..5_000,
            ch in 1u32..5_000,
        ) {
            let canvas = CanvasSize::new(cw, ch);
            let t = TransformState::cover(w, h, canvas);
            let eps = 1e-6;
            prop_assert!(t.scale * w as f64 >= cw as f64 - eps);
            prop_assert!(t.scale * h as f64 >= ch as f64 - eps);
            prop_assert_eq!(t.pos_x, (cw as f64 - w as f64 * t.scale) / 2.0);
            prop_assert_eq!(t.pos_y, (ch as f64 - h as f64 * t.scale) / 2.0);
        }
    }
}
