//! Composition of one or two captures into a single output image.
//!
//! Two layouts: `Stacked` puts the screens on top of each other at native
//! size, `Framed` scales them into a fixed device-shell canvas. Inputs are
//! taken by value so they are released as soon as composition returns,
//! whether it succeeded or not.

mod assets;
mod framed;
mod stacked;

pub use assets::{default_frames_dir, BuiltinFrameAssets, DirectoryFrameAssets, FrameAssets};
pub use framed::{compose_framed, Slot, FRAME_HEIGHT, FRAME_MAIN_SLOT, FRAME_SUB_SLOT, FRAME_WIDTH};
pub use stacked::{stack_layout, stack_vertically, StackLayout};

use crate::capture::PixelBuffer;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

/// Device-shell color for the framed composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameColor {
    Black,
    White,
    Grey,
    Purple,
}

impl FrameColor {
    /// Index from settings. Unknown indices fall back to black.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => FrameColor::White,
            2 => FrameColor::Grey,
            3 => FrameColor::Purple,
            _ => FrameColor::Black,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            FrameColor::Black => 0,
            FrameColor::White => 1,
            FrameColor::Grey => 2,
            FrameColor::Purple => 3,
        }
    }

    /// Base name of the background asset.
    pub fn asset_name(self) -> &'static str {
        match self {
            FrameColor::Black => "black",
            FrameColor::White => "white",
            FrameColor::Grey => "grey",
            FrameColor::Purple => "purple",
        }
    }
}

/// Framed output quality level, 6 through 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageQuality(u8);

impl ImageQuality {
    pub const MIN_LEVEL: u8 = 6;
    pub const MAX_LEVEL: u8 = 10;

    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN_LEVEL, Self::MAX_LEVEL))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// JPEG quality, 60 through 100.
    pub fn encoder_quality(self) -> u8 {
        self.0 * 10
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionLayout {
    Stacked,
    Framed {
        color: FrameColor,
        quality: ImageQuality,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Lossless.
    Png,
    Jpeg { quality: u8 },
}

impl Encoding {
    pub fn extension(self) -> &'static str {
        match self {
            Encoding::Png => "png",
            Encoding::Jpeg { .. } => "jpg",
        }
    }
}

/// Composition result, not yet encoded.
#[derive(Debug, Clone)]
pub struct ComposedImage {
    pub image: RgbaImage,
    pub encoding: Encoding,
}

impl ComposedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode with the layout's output format.
    pub fn encode(&self) -> Result<Vec<u8>, ComposeError> {
        let mut bytes = Cursor::new(Vec::new());
        match self.encoding {
            Encoding::Png => {
                DynamicImage::ImageRgba8(self.image.clone())
                    .write_to(&mut bytes, ImageFormat::Png)
                    .map_err(|e| ComposeError::Encoding(e.to_string()))?;
            }
            Encoding::Jpeg { quality } => {
                // JPEG has no alpha channel.
                let rgb: RgbImage = self.image.convert();
                JpegEncoder::new_with_quality(&mut bytes, quality)
                    .encode_image(&rgb)
                    .map_err(|e| ComposeError::Encoding(e.to_string()))?;
            }
        }
        Ok(bytes.into_inner())
    }
}

pub struct CompositionEngine {
    assets: Arc<dyn FrameAssets>,
}

impl CompositionEngine {
    pub fn new(assets: Arc<dyn FrameAssets>) -> Self {
        Self { assets }
    }

    /// Compose the given captures.
    ///
    /// Either input may be absent. `Stacked` with a single input returns that
    /// input unchanged; `Framed` leaves the missing slot empty.
    pub fn compose(
        &self,
        layout: CompositionLayout,
        main: Option<PixelBuffer>,
        sub: Option<PixelBuffer>,
    ) -> Result<ComposedImage, ComposeError> {
        if main.is_none() && sub.is_none() {
            return Err(ComposeError::NoInput);
        }

        let start = Instant::now();
        let main = main.map(to_rgba).transpose()?;
        let sub = sub.map(to_rgba).transpose()?;

        let composed = match layout {
            CompositionLayout::Stacked => {
                let image = match (main, sub) {
                    (Some(main), Some(sub)) => stack_vertically(&main, &sub),
                    (Some(only), None) | (None, Some(only)) => only,
                    (None, None) => return Err(ComposeError::NoInput),
                };
                ComposedImage {
                    image,
                    encoding: Encoding::Png,
                }
            }
            CompositionLayout::Framed { color, quality } => {
                let background = self.assets.background(color)?;
                let image = compose_framed(main.as_ref(), sub.as_ref(), &background);
                ComposedImage {
                    image,
                    encoding: Encoding::Jpeg {
                        quality: quality.encoder_quality(),
                    },
                }
            }
        };

        log::info!(
            "[COMPOSE] {:?} composite {}x{} in {}ms",
            layout,
            composed.width(),
            composed.height(),
            start.elapsed().as_millis()
        );
        Ok(composed)
    }
}

fn to_rgba(buffer: PixelBuffer) -> Result<RgbaImage, ComposeError> {
    buffer
        .into_drawable()
        .map(|d| d.into_image())
        .map_err(|e| ComposeError::Conversion(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Nothing to compose: both inputs are absent")]
    NoInput,

    #[error("Input buffer could not be made drawable: {0}")]
    Conversion(String),

    #[error("Frame background {name} unavailable: {reason}")]
    Asset { name: &'static str, reason: String },

    #[error("Image encoding failed: {0}")]
    Encoding(String),
}
