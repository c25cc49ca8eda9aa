//! Readiness of the privileged capture capability.
//!
//! Display-scoped capture is only possible once the platform service that
//! grants it reports itself connected. The connection is published once on a
//! watch channel; later `connect` calls change nothing.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("Capture service not ready")]
    ServiceNotReady,

    #[error("Platform does not support display capture")]
    PlatformTooOld,
}

pub struct CaptureCapability {
    connected: watch::Sender<bool>,
    scoped_capture_supported: bool,
}

impl CaptureCapability {
    pub fn new(scoped_capture_supported: bool) -> Self {
        let (connected, _) = watch::channel(false);
        Self {
            connected,
            scoped_capture_supported,
        }
    }

    /// Mark the capability connected. Returns `true` only the first time.
    pub fn connect(&self) -> bool {
        let first = self.connected.send_if_modified(|connected| {
            if *connected {
                false
            } else {
                *connected = true;
                true
            }
        });
        if first {
            log::info!("[CAPTURE] Capture capability connected and ready");
        }
        first
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    pub fn supports_scoped_capture(&self) -> bool {
        self.scoped_capture_supported
    }

    /// Receiver that observes the connection event.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    pub fn ensure_ready(&self) -> Result<(), Unavailable> {
        if !self.is_connected() {
            return Err(Unavailable::ServiceNotReady);
        }
        if !self.scoped_capture_supported {
            return Err(Unavailable::PlatformTooOld);
        }
        Ok(())
    }
}
