use super::coords::CanvasSize;
use super::effects::background::{self, BackgroundFill};
use super::effects::overlay::OverlayFrame;
use super::transform::TransformState;
use crate::media::MediaSource;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// Draws one frame: transformed media layer, then the overlay on top.
pub struct Compositor {
    canvas: CanvasSize,
}

impl Compositor {
    pub fn new(canvas: CanvasSize) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn blank_surface(&self) -> RgbaImage {
        background::create_background_image(
            self.canvas.width,
            self.canvas.height,
            BackgroundFill::Transparent,
        )
    }

    /// Full clear-and-redraw of `surface` from the given state.
    ///
    /// With no media the surface is only cleared; the overlay is drawn only
    /// over loaded media.
    pub fn render(
        &self,
        surface: &mut RgbaImage,
        media: Option<&MediaSource>,
        transform: &TransformState,
        overlay: Option<&mut OverlayFrame>,
    ) {
        if surface.dimensions() != (self.canvas.width, self.canvas.height) {
            *surface = self.blank_surface();
        } else {
            background::clear(surface, BackgroundFill::Transparent);
        }

        let Some(media) = media else {
            return;
        };

        if let Some(frame) = media.frame.as_ref() {
            if media.natural_width > 0 && media.natural_height > 0 {
                draw_transformed(
                    surface,
                    frame,
                    media.natural_width,
                    media.natural_height,
                    transform,
                );
            }
        }

        if let Some(overlay) = overlay {
            composite(surface, overlay.fitted(self.canvas), 0, 0);
        }
    }
}

/// Draw `frame` scaled to `natural * scale`, rotated by `rotation_deg`
/// around the center of the scaled box whose top-left is `(pos_x, pos_y)`.
///
/// Works backwards from destination pixels: each canvas pixel inside the
/// rotated box is un-rotated into media space and sampled bilinearly.
fn draw_transformed(
    surface: &mut RgbaImage,
    frame: &RgbaImage,
    natural_width: u32,
    natural_height: u32,
    transform: &TransformState,
) {
    let (dw, dh) = transform.displayed_size(natural_width, natural_height);
    if dw <= 0.0 || dh <= 0.0 {
        return;
    }
    let (cx, cy) = transform.pivot(natural_width, natural_height);
    let rad = transform.rotation_deg.to_radians();
    let (sin_a, cos_a) = rad.sin_cos();

    // Axis-aligned bounds of the rotated box, clipped to the surface
    let ex = (dw / 2.0 * cos_a).abs() + (dh / 2.0 * sin_a).abs();
    let ey = (dw / 2.0 * sin_a).abs() + (dh / 2.0 * cos_a).abs();
    let width = surface.width() as f64;
    let height = surface.height() as f64;
    let x0 = (cx - ex).floor().clamp(0.0, width) as usize;
    let x1 = (cx + ex).ceil().clamp(0.0, width) as usize;
    let y0 = (cy - ey).floor().clamp(0.0, height) as usize;
    let y1 = (cy + ey).ceil().clamp(0.0, height) as usize;
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    // Media space → frame pixel space (poster frames may differ from the
    // probed size)
    let fx = frame.width() as f64 / (natural_width as f64 * transform.scale);
    let fy = frame.height() as f64 / (natural_height as f64 * transform.scale);
    let frame_w = frame.width() as f64;
    let frame_h = frame.height() as f64;

    let row_len = surface.width() as usize * 4;
    let buf: &mut [u8] = surface;
    buf[y0 * row_len..y1 * row_len]
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(i, row)| {
            let py = (y0 + i) as f64 + 0.5;
            let dy = py - cy;
            for x in x0..x1 {
                let dx = x as f64 + 0.5 - cx;
                // Inverse rotation into the unrotated, scaled box
                let ux = dx * cos_a + dy * sin_a + dw / 2.0;
                let uy = -dx * sin_a + dy * cos_a + dh / 2.0;
                let sx = ux * fx;
                let sy = uy * fy;
                if sx < 0.0 || sy < 0.0 || sx >= frame_w || sy >= frame_h {
                    continue;
                }
                let src = sample_bilinear(frame, sx - 0.5, sy - 0.5);
                if src[3] == 0 {
                    continue;
                }
                let idx = x * 4;
                let dst = Rgba([row[idx], row[idx + 1], row[idx + 2], row[idx + 3]]);
                let out = blend_pixel(dst, src);
                row[idx..idx + 4].copy_from_slice(&out.0);
            }
        });
}

fn sample_bilinear(img: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let max_x = img.width() as i64 - 1;
    let max_y = img.height() as i64 - 1;
    let xf = x.floor();
    let yf = y.floor();
    let tx = x - xf;
    let ty = y - yf;
    let x0 = (xf as i64).clamp(0, max_x) as u32;
    let y0 = (yf as i64).clamp(0, max_y) as u32;
    let x1 = (xf as i64 + 1).clamp(0, max_x) as u32;
    let y1 = (yf as i64 + 1).clamp(0, max_y) as u32;

    let p00 = img.get_pixel(x0, y0);
    let p10 = img.get_pixel(x1, y0);
    let p01 = img.get_pixel(x0, y1);
    let p11 = img.get_pixel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f64 * (1.0 - tx) + p10[c] as f64 * tx;
        let bottom = p01[c] as f64 * (1.0 - tx) + p11[c] as f64 * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Alpha-composite `overlay` onto `canvas` with its top-left at the offset.
pub fn composite(canvas: &mut RgbaImage, overlay: &RgbaImage, offset_x: u32, offset_y: u32) {
    for y in 0..overlay.height() {
        for x in 0..overlay.width() {
            let cx = x + offset_x;
            let cy = y + offset_y;
            if cx < canvas.width() && cy < canvas.height() {
                let src = overlay.get_pixel(x, y);
                if src[3] > 0 {
                    let dst = canvas.get_pixel(cx, cy);
                    let blended = blend_pixel(*dst, *src);
                    canvas.put_pixel(cx, cy, blended);
                }
            }
        }
    }
}

/// Source-over blend.
pub fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f64 / 255.0;
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let r = (src[0] as f64 * sa + dst[0] as f64 * da * (1.0 - sa)) / out_a;
    let g = (src[1] as f64 * sa + dst[1] as f64 * da * (1.0 - sa)) / out_a;
    let b = (src[2] as f64 * sa + dst[2] as f64 * da * (1.0 - sa)) / out_a;
    Rgba([
        r.round() as u8,
        g.round() as u8,
        b.round() as u8,
        (out_a * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn media(w: u32, h: u32, color: Rgba<u8>) -> MediaSource {
        MediaSource::from_image(PathBuf::from("test.png"), RgbaImage::from_pixel(w, h, color))
    }

    #[test]
    fn test_idle_clears_and_skips_overlay() {
        let comp = Compositor::new(CanvasSize::new(8, 8));
        let mut surface = RgbaImage::from_pixel(8, 8, RED);
        let mut overlay = OverlayFrame::from_image(RgbaImage::from_pixel(8, 8, RED));
        comp.render(&mut surface, None, &TransformState::default(), Some(&mut overlay));
        assert!(surface.pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn test_unrotated_media_lands_at_position() {
        let comp = Compositor::new(CanvasSize::new(20, 20));
        let mut surface = comp.blank_surface();
        let m = media(4, 4, RED);
        let t = TransformState { scale: 2.0, rotation_deg: 0.0, pos_x: 5.0, pos_y: 6.0 };
        comp.render(&mut surface, Some(&m), &t, None);

        // Covers x 5..13, y 6..14
        assert_eq!(*surface.get_pixel(5, 6), RED);
        assert_eq!(*surface.get_pixel(12, 13), RED);
        assert_eq!(*surface.get_pixel(4, 6), CLEAR);
        assert_eq!(*surface.get_pixel(13, 6), CLEAR);
        assert_eq!(*surface.get_pixel(5, 14), CLEAR);
    }

    #[test]
    fn test_quarter_turn_swaps_extent_around_pivot() {
        let comp = Compositor::new(CanvasSize::new(40, 40));
        let mut surface = comp.blank_surface();
        // 20x4 bar centred at (20, 20)
        let m = media(20, 4, RED);
        let t = TransformState { scale: 1.0, rotation_deg: 90.0, pos_x: 10.0, pos_y: 18.0 };
        comp.render(&mut surface, Some(&m), &t, None);

        // Rotated: 4 wide, 20 tall around the same centre
        assert_eq!(*surface.get_pixel(20, 11), RED);
        assert_eq!(*surface.get_pixel(20, 28), RED);
        assert_eq!(*surface.get_pixel(11, 20), CLEAR);
        assert_eq!(*surface.get_pixel(28, 20), CLEAR);
    }

    #[test]
    fn test_overlay_drawn_on_top() {
        let comp = Compositor::new(CanvasSize::new(10, 10));
        let mut surface = comp.blank_surface();
        let m = media(10, 10, RED);
        let blue = Rgba([0, 0, 255, 255]);
        let mut frame = RgbaImage::from_pixel(10, 10, CLEAR);
        frame.put_pixel(0, 0, blue);
        let mut overlay = OverlayFrame::from_image(frame);
        let t = TransformState::cover(10, 10, comp.canvas());
        comp.render(&mut surface, Some(&m), &t, Some(&mut overlay));

        // Opaque overlay pixel covers the media; transparent ones let it through
        assert_eq!(*surface.get_pixel(0, 0), blue);
        assert_eq!(*surface.get_pixel(9, 9), RED);
    }

    #[test]
    fn test_media_without_frame_draws_only_overlay() {
        let comp = Compositor::new(CanvasSize::new(6, 6));
        let mut surface = comp.blank_surface();
        let mut m = media(6, 6, RED);
        m.frame = None;
        let mut overlay = OverlayFrame::from_image(RgbaImage::from_pixel(6, 6, Rgba([0, 255, 0, 255])));
        comp.render(&mut surface, Some(&m), &TransformState::default(), Some(&mut overlay));
        assert!(surface.pixels().all(|p| *p == Rgba([0, 255, 0, 255])));
    }

    #[test]
    fn test_blend_opaque_source_wins() {
        let out = blend_pixel(Rgba([10, 10, 10, 255]), RED);
        assert_eq!(out, RED);
        let out = blend_pixel(RED, CLEAR);
        assert_eq!(out, RED);
    }
}
