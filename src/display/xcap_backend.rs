//! Desktop monitor enumeration using the `xcap` crate.
//!
//! This is the infrastructure layer: it talks to the OS. Device builds
//! replace it with the platform's display manager.

use super::{DisplayBackend, DisplayError, DisplayInfo};
use xcap::Monitor;

pub struct XcapDisplayBackend;

impl DisplayBackend for XcapDisplayBackend {
    fn enumerate(&self) -> Result<Vec<DisplayInfo>, DisplayError> {
        let monitors =
            Monitor::all().map_err(|e| DisplayError::Enumeration(e.to_string()))?;

        let displays = monitors
            .iter()
            .filter_map(|m| {
                let id = m.id().ok()?;
                Some(DisplayInfo {
                    id,
                    name: m.name().unwrap_or_else(|_| format!("Monitor {}", id)),
                    width: m.width().unwrap_or(0),
                    height: m.height().unwrap_or(0),
                    scale_factor: m.scale_factor().unwrap_or(1.0),
                })
            })
            .collect();

        Ok(displays)
    }

    /// The monitor flagged primary, else the first one, else 0.
    fn default_display_id(&self) -> u32 {
        let monitors = match Monitor::all() {
            Ok(monitors) => monitors,
            Err(e) => {
                log::warn!("[DISPLAY] Failed to enumerate monitors: {}", e);
                return 0;
            }
        };

        monitors
            .iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| monitors.first())
            .and_then(|m| m.id().ok())
            .unwrap_or(0)
    }
}
