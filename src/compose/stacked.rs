//! Vertical stack layout. Pure geometry plus a native-size blit.

use image::{imageops, RgbaImage};

/// Placement of both screens on the stacked canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackLayout {
    pub width: u32,
    pub height: u32,
    pub main_origin: (u32, u32),
    pub sub_origin: (u32, u32),
}

/// Canvas is as wide as the wider screen and as tall as both combined.
/// Each screen is centered horizontally; the secondary sits directly below.
pub fn stack_layout(main: (u32, u32), sub: (u32, u32)) -> StackLayout {
    let width = main.0.max(sub.0);
    StackLayout {
        width,
        height: main.1 + sub.1,
        main_origin: ((width - main.0) / 2, 0),
        sub_origin: ((width - sub.0) / 2, main.1),
    }
}

pub fn stack_vertically(main: &RgbaImage, sub: &RgbaImage) -> RgbaImage {
    let layout = stack_layout(main.dimensions(), sub.dimensions());
    let mut canvas = RgbaImage::new(layout.width, layout.height);
    imageops::replace(
        &mut canvas,
        main,
        layout.main_origin.0 as i64,
        layout.main_origin.1 as i64,
    );
    imageops::replace(
        &mut canvas,
        sub,
        layout.sub_origin.0 as i64,
        layout.sub_origin.1 as i64,
    );
    canvas
}
