//! Fixed-canvas device-frame layout.
//!
//! Both screens are scaled into fixed slots, then the decorative background
//! is drawn over the whole canvas. The background carries transparent
//! windows where the screens show through.

use image::imageops::{self, FilterType};
use image::RgbaImage;

pub const FRAME_WIDTH: u32 = 2400;
pub const FRAME_HEIGHT: u32 = 2900;

/// Destination rectangle on the frame canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub const FRAME_MAIN_SLOT: Slot = Slot {
    x: 240,
    y: 180,
    width: 1920,
    height: 1080,
};

pub const FRAME_SUB_SLOT: Slot = Slot {
    x: 655,
    y: 1538,
    width: 1090,
    height: 950,
};

/// Always returns a `FRAME_WIDTH`x`FRAME_HEIGHT` image, whatever the input
/// and background sizes are. A missing input leaves its slot empty.
pub fn compose_framed(
    main: Option<&RgbaImage>,
    sub: Option<&RgbaImage>,
    background: &RgbaImage,
) -> RgbaImage {
    let mut canvas = RgbaImage::new(FRAME_WIDTH, FRAME_HEIGHT);

    if let Some(main) = main {
        place(&mut canvas, main, FRAME_MAIN_SLOT);
    }
    if let Some(sub) = sub {
        place(&mut canvas, sub, FRAME_SUB_SLOT);
    }

    if background.dimensions() == (FRAME_WIDTH, FRAME_HEIGHT) {
        imageops::overlay(&mut canvas, background, 0, 0);
    } else {
        log::warn!(
            "[COMPOSE] Frame background is {}x{}, rescaling to {}x{}",
            background.width(),
            background.height(),
            FRAME_WIDTH,
            FRAME_HEIGHT
        );
        let fitted = imageops::resize(background, FRAME_WIDTH, FRAME_HEIGHT, FilterType::Triangle);
        imageops::overlay(&mut canvas, &fitted, 0, 0);
    }

    canvas
}

fn place(canvas: &mut RgbaImage, image: &RgbaImage, slot: Slot) {
    if image.dimensions() == (slot.width, slot.height) {
        imageops::replace(canvas, image, slot.x as i64, slot.y as i64);
    } else {
        let scaled = imageops::resize(image, slot.width, slot.height, FilterType::Triangle);
        imageops::replace(canvas, &scaled, slot.x as i64, slot.y as i64);
    }
}
