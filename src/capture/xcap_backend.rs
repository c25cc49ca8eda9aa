//! Desktop screen capture using the `xcap` crate.
//!
//! This is the infrastructure layer: it talks to the OS. xcap is blocking,
//! so each request runs on its own thread and answers through the callback.

use super::adapter::{CaptureCallback, ScreenshotBackend, ERROR_INTERNAL, ERROR_INVALID_DISPLAY};
use super::{ColorSpace, PixelBuffer};
use xcap::Monitor;

pub struct XcapScreenshotBackend;

impl ScreenshotBackend for XcapScreenshotBackend {
    fn take_screenshot(&self, display_id: u32, callback: CaptureCallback) {
        let spawned = std::thread::Builder::new()
            .name(format!("capture-{}", display_id))
            .spawn(move || callback(capture_monitor(display_id)));

        // On spawn failure the callback is dropped with the closure, which
        // the adapter reports as a failed capture.
        if let Err(e) = spawned {
            log::error!("[CAPTURE] Failed to spawn capture thread: {}", e);
        }
    }
}

/// Captures the monitor whose xcap id equals `display_id`.
fn capture_monitor(display_id: u32) -> Result<PixelBuffer, i32> {
    let monitors = Monitor::all().map_err(|e| {
        log::error!("[CAPTURE] Failed to enumerate monitors: {}", e);
        ERROR_INTERNAL
    })?;

    let monitor = monitors
        .into_iter()
        .find(|m| m.id().ok() == Some(display_id))
        .ok_or(ERROR_INVALID_DISPLAY)?;

    let image = monitor.capture_image().map_err(|e| {
        log::error!("[CAPTURE] Screen capture failed: {}", e);
        ERROR_INTERNAL
    })?;

    Ok(PixelBuffer::from_rgba(image, ColorSpace::Srgb))
}
