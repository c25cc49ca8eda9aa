//! Frame background assets.
//!
//! Backgrounds are looked up as `<data dir>/dualshot/frames/<color>.png`
//! (`black`, `white`, `grey`, `purple`), 2400x2900 with transparent windows
//! over the two screen slots. Nothing installs those files; without them the
//! desktop build draws a plain shell with [`BuiltinFrameAssets`].

use super::framed::{Slot, FRAME_HEIGHT, FRAME_MAIN_SLOT, FRAME_SUB_SLOT, FRAME_WIDTH};
use super::{ComposeError, FrameColor};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Source of the decorative background for a frame color.
pub trait FrameAssets: Send + Sync {
    fn background(&self, color: FrameColor) -> Result<RgbaImage, ComposeError>;
}

/// Loads `<dir>/<color>.png`, e.g. `frames/grey.png`.
pub struct DirectoryFrameAssets {
    dir: PathBuf,
    fallback: Option<BuiltinFrameAssets>,
}

impl DirectoryFrameAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fallback: None,
        }
    }

    /// Draw the built-in shell when a background file cannot be loaded.
    pub fn with_builtin_fallback(mut self) -> Self {
        self.fallback = Some(BuiltinFrameAssets);
        self
    }

    pub fn at_default_location() -> Self {
        Self::new(default_frames_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, color: FrameColor) -> PathBuf {
        self.dir.join(format!("{}.png", color.asset_name()))
    }
}

impl FrameAssets for DirectoryFrameAssets {
    fn background(&self, color: FrameColor) -> Result<RgbaImage, ComposeError> {
        let path = self.path_for(color);
        log::debug!("[COMPOSE] Loading frame background {}", path.display());
        match image::open(&path) {
            Ok(image) => Ok(image.to_rgba8()),
            Err(e) => match &self.fallback {
                Some(builtin) => {
                    log::warn!(
                        "[COMPOSE] {} unavailable ({}), using built-in {} frame",
                        path.display(),
                        e,
                        color.asset_name()
                    );
                    builtin.background(color)
                }
                None => Err(ComposeError::Asset {
                    name: color.asset_name(),
                    reason: format!("{}: {}", path.display(), e),
                }),
            },
        }
    }
}

/// Solid device shell in the frame color, with a bezel around each slot and
/// the slots themselves left transparent.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFrameAssets;

const BEZEL_PX: u32 = 24;

impl BuiltinFrameAssets {
    fn shell_color(color: FrameColor) -> (Rgba<u8>, Rgba<u8>) {
        match color {
            FrameColor::Black => (Rgba([28, 28, 30, 255]), Rgba([8, 8, 8, 255])),
            FrameColor::White => (Rgba([242, 242, 247, 255]), Rgba([209, 209, 214, 255])),
            FrameColor::Grey => (Rgba([142, 142, 147, 255]), Rgba([99, 99, 102, 255])),
            FrameColor::Purple => (Rgba([94, 58, 140, 255]), Rgba([61, 36, 94, 255])),
        }
    }
}

impl FrameAssets for BuiltinFrameAssets {
    fn background(&self, color: FrameColor) -> Result<RgbaImage, ComposeError> {
        let (shell, bezel) = Self::shell_color(color);
        let mut image = RgbaImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, shell);
        for slot in [FRAME_MAIN_SLOT, FRAME_SUB_SLOT] {
            fill(&mut image, grow(slot, BEZEL_PX), bezel);
            fill(&mut image, slot, Rgba([0, 0, 0, 0]));
        }
        Ok(image)
    }
}

fn grow(slot: Slot, by: u32) -> Slot {
    let x = slot.x.saturating_sub(by);
    let y = slot.y.saturating_sub(by);
    Slot {
        x,
        y,
        width: (slot.x + slot.width + by).min(FRAME_WIDTH) - x,
        height: (slot.y + slot.height + by).min(FRAME_HEIGHT) - y,
    }
}

fn fill(image: &mut RgbaImage, area: Slot, pixel: Rgba<u8>) {
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            image.put_pixel(x, y, pixel);
        }
    }
}

/// `<data dir>/dualshot/frames`
pub fn default_frames_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dualshot")
        .join("frames")
}
