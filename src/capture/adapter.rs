//! Single-display capture with a bounded wait.
//!
//! Platform screenshot APIs answer through a callback on some other thread.
//! The adapter hands the backend a one-shot callback and awaits it with a
//! timeout. A timeout is a failure; a callback that fires late finds the
//! receiver gone and its buffer is dropped on the spot.

use super::{CaptureCapability, CaptureError, PixelBuffer};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// Default upper bound on a single capture.
pub const CAPTURE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Backend-side internal failure.
pub const ERROR_INTERNAL: i32 = 1;
/// The requested display id does not exist.
pub const ERROR_INVALID_DISPLAY: i32 = 4;
/// The backend dropped the callback without calling it.
pub const ERROR_CALLBACK_DROPPED: i32 = -1;

/// Completion callback: a buffer, or a backend error code.
pub type CaptureCallback = Box<dyn FnOnce(Result<PixelBuffer, i32>) + Send + 'static>;

/// Platform seam for one-shot display capture.
pub trait ScreenshotBackend: Send + Sync {
    /// Start capturing `display_id`. Must not block; the callback may run on
    /// any thread, at most once.
    fn take_screenshot(&self, display_id: u32, callback: CaptureCallback);
}

pub struct FrameCaptureAdapter {
    backend: Arc<dyn ScreenshotBackend>,
    capability: Arc<CaptureCapability>,
    timeout: Duration,
}

impl FrameCaptureAdapter {
    pub fn new(backend: Arc<dyn ScreenshotBackend>, capability: Arc<CaptureCapability>) -> Self {
        Self {
            backend,
            capability,
            timeout: CAPTURE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Capture one display.
    pub async fn capture(&self, display_id: u32) -> Result<PixelBuffer, CaptureError> {
        self.capability.ensure_ready()?;

        let start = Instant::now();
        let (tx, rx) = oneshot::channel();
        self.backend.take_screenshot(
            display_id,
            Box::new(move |result| {
                // Receiver is gone after a timeout; the buffer drops here.
                let _ = tx.send(result);
            }),
        );

        let result = match tokio::time::timeout(self.timeout, rx).await {
            Err(_) => {
                log::error!(
                    "[CAPTURE] Display {} did not answer within {}ms",
                    display_id,
                    self.timeout.as_millis()
                );
                return Err(CaptureError::CaptureTimeout {
                    display_id,
                    timeout: self.timeout,
                });
            }
            Ok(Err(_)) => Err(ERROR_CALLBACK_DROPPED),
            Ok(Ok(result)) => result,
        };

        match result {
            Ok(buffer) => {
                log::info!(
                    "[CAPTURE] Display {} captured {}x{} ({:?}) in {}ms",
                    display_id,
                    buffer.width(),
                    buffer.height(),
                    buffer.format(),
                    start.elapsed().as_millis()
                );
                Ok(buffer)
            }
            Err(code) => {
                log::error!(
                    "[CAPTURE] Display {} capture failed, code {}",
                    display_id,
                    code
                );
                Err(CaptureError::CaptureFailed { display_id, code })
            }
        }
    }
}
