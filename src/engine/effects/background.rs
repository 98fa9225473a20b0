use image::{Rgba, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundFill {
    Solid { color: [u8; 3] },
    Transparent,
}

impl BackgroundFill {
    pub const WHITE: BackgroundFill = BackgroundFill::Solid { color: [255, 255, 255] };
}

pub fn create_background_image(width: u32, height: u32, fill: BackgroundFill) -> RgbaImage {
    RgbaImage::from_pixel(width, height, fill_pixel(fill))
}

/// Reset every pixel of an existing surface.
pub fn clear(img: &mut RgbaImage, fill: BackgroundFill) {
    let px = fill_pixel(fill);
    for p in img.pixels_mut() {
        *p = px;
    }
}

fn fill_pixel(fill: BackgroundFill) -> Rgba<u8> {
    match fill {
        BackgroundFill::Solid { color } => Rgba([color[0], color[1], color[2], 255]),
        BackgroundFill::Transparent => Rgba([0, 0, 0, 0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_background() {
        let img = create_background_image(4, 3, BackgroundFill::WHITE);
        assert_eq!(img.dimensions(), (4, 3));
        assert!(img.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_clear_to_transparent() {
        let mut img = create_background_image(2, 2, BackgroundFill::WHITE);
        clear(&mut img, BackgroundFill::Transparent);
        assert!(img.pixels().all(|p| p[3] == 0));
    }
}
