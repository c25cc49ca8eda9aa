//! Frame capture domain, public API.
//!
//! This module owns single-display capture: the readiness capability, the
//! pixel buffer types, and the adapter that turns a platform callback into a
//! bounded async wait. External code should only use what is exported here.

mod adapter;
mod buffer;
mod capability;
mod xcap_backend;

pub use adapter::{
    CaptureCallback, FrameCaptureAdapter, ScreenshotBackend, CAPTURE_TIMEOUT,
    ERROR_CALLBACK_DROPPED, ERROR_INTERNAL, ERROR_INVALID_DISPLAY,
};
pub use buffer::{ColorSpace, DrawableBuffer, HardwareFrame, PixelBuffer, PixelFormat};
pub use capability::{CaptureCapability, Unavailable};
pub use xcap_backend::XcapScreenshotBackend;

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("{0}")]
    CapabilityUnavailable(#[from] Unavailable),

    #[error("No secondary display detected")]
    DisplayNotFound,

    #[error("Capture of display {display_id} timed out after {timeout:?}")]
    CaptureTimeout { display_id: u32, timeout: Duration },

    #[error("Capture of display {display_id} failed with code {code}")]
    CaptureFailed { display_id: u32, code: i32 },

    #[error("Hardware buffer conversion failed: {0}")]
    Conversion(String),
}
