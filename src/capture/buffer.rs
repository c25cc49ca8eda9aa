//! Captured pixel buffers.
//!
//! A capture yields either a software RGBA image or a hardware-backed frame.
//! Hardware frames cannot be drawn into; [`PixelBuffer::into_drawable`] is
//! the only way to get pixels out of them, and it consumes the buffer.

use super::CaptureError;
use image::RgbaImage;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Software-addressable 8-bit RGBA.
    Rgba8,
    /// GPU-resident, must be read back before pixel access.
    Hardware,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    #[default]
    Srgb,
    DisplayP3,
    Unknown,
}

/// A frame living in graphics memory.
pub trait HardwareFrame: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Copy the frame into system memory.
    fn read_back(&self) -> Result<RgbaImage, String>;
}

enum Storage {
    Software(RgbaImage),
    Hardware(Box<dyn HardwareFrame>),
}

/// An owned capture result. Dropping it releases the underlying memory.
pub struct PixelBuffer {
    storage: Storage,
    color_space: ColorSpace,
}

impl PixelBuffer {
    pub fn from_rgba(image: RgbaImage, color_space: ColorSpace) -> Self {
        Self {
            storage: Storage::Software(image),
            color_space,
        }
    }

    pub fn from_hardware(frame: Box<dyn HardwareFrame>, color_space: ColorSpace) -> Self {
        Self {
            storage: Storage::Hardware(frame),
            color_space,
        }
    }

    pub fn width(&self) -> u32 {
        match &self.storage {
            Storage::Software(image) => image.width(),
            Storage::Hardware(frame) => frame.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match &self.storage {
            Storage::Software(image) => image.height(),
            Storage::Hardware(frame) => frame.height(),
        }
    }

    pub fn format(&self) -> PixelFormat {
        match self.storage {
            Storage::Software(_) => PixelFormat::Rgba8,
            Storage::Hardware(_) => PixelFormat::Hardware,
        }
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Convert into a software buffer that can be composited.
    ///
    /// Software buffers pass through untouched. Hardware frames are read
    /// back; the read-back must match the advertised dimensions.
    pub fn into_drawable(self) -> Result<DrawableBuffer, CaptureError> {
        let color_space = self.color_space;
        let image = match self.storage {
            Storage::Software(image) => image,
            Storage::Hardware(frame) => {
                let (w, h) = (frame.width(), frame.height());
                log::debug!("[CAPTURE] Reading back {}x{} hardware frame", w, h);
                let image = frame.read_back().map_err(CaptureError::Conversion)?;
                if image.width() != w || image.height() != h {
                    return Err(CaptureError::Conversion(format!(
                        "read-back produced {}x{}, expected {}x{}",
                        image.width(),
                        image.height(),
                        w,
                        h
                    )));
                }
                image
            }
        };
        Ok(DrawableBuffer { image, color_space })
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format())
            .field("color_space", &self.color_space)
            .finish()
    }
}

/// Software RGBA pixels ready for drawing.
#[derive(Debug, Clone)]
pub struct DrawableBuffer {
    image: RgbaImage,
    color_space: ColorSpace,
}

impl DrawableBuffer {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
