//! Display enumeration: which surface is primary, which is secondary.
//!
//! Nothing here is cached. Displays attach and detach between a gesture and
//! the capture it triggers, so every lookup re-enumerates.

mod xcap_backend;

pub use xcap_backend::XcapDisplayBackend;

/// One surface as reported by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayInfo {
    pub id: u32,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
}

/// Platform seam for display enumeration.
pub trait DisplayBackend: Send + Sync {
    /// All currently attached surfaces, in platform order.
    fn enumerate(&self) -> Result<Vec<DisplayInfo>, DisplayError>;

    /// The id the platform designates as its default surface.
    fn default_display_id(&self) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRole {
    Primary,
    Secondary,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Present,
    Absent,
}

/// Conversion factor between density-independent units and pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Density(pub f32);

impl Density {
    pub fn dp_to_px(self, dp: f32) -> f32 {
        (dp * self.0).round()
    }
}

impl Default for Density {
    fn default() -> Self {
        Density(1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySurfaceRef {
    pub id: u32,
    pub role: DisplayRole,
    pub liveness: Liveness,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub density: Density,
}

pub struct DisplayRegistry {
    backend: std::sync::Arc<dyn DisplayBackend>,
}

impl DisplayRegistry {
    pub fn new(backend: std::sync::Arc<dyn DisplayBackend>) -> Self {
        Self { backend }
    }

    pub fn primary_display_id(&self) -> u32 {
        self.backend.default_display_id()
    }

    /// Every known surface with its role.
    ///
    /// The default surface is always listed first. If the platform did not
    /// enumerate it, it is reported as `Absent`.
    pub fn list_displays(&self) -> Vec<DisplaySurfaceRef> {
        let default_id = self.backend.default_display_id();
        let displays = match self.backend.enumerate() {
            Ok(displays) => displays,
            Err(e) => {
                log::warn!("[DISPLAY] Enumeration failed: {}", e);
                Vec::new()
            }
        };

        let mut refs = Vec::with_capacity(displays.len() + 1);
        if !displays.iter().any(|d| d.id == default_id) {
            refs.push(DisplaySurfaceRef {
                id: default_id,
                role: DisplayRole::Primary,
                liveness: Liveness::Absent,
                name: String::new(),
                width: 0,
                height: 0,
                density: Density::default(),
            });
        }

        let mut secondary_assigned = false;
        let mut primary = Vec::new();
        let mut others = Vec::new();
        for display in displays {
            let role = if display.id == default_id {
                DisplayRole::Primary
            } else if !secondary_assigned {
                secondary_assigned = true;
                DisplayRole::Secondary
            } else {
                DisplayRole::Unknown
            };

            let surface = DisplaySurfaceRef {
                id: display.id,
                role,
                liveness: Liveness::Present,
                name: display.name,
                width: display.width,
                height: display.height,
                density: Density(display.scale_factor),
            };
            if role == DisplayRole::Primary {
                primary.push(surface);
            } else {
                others.push(surface);
            }
        }

        refs.extend(primary);
        refs.extend(others);
        refs
    }

    /// The first enumerated surface that is not the default one.
    pub fn secondary_display(&self) -> Option<DisplaySurfaceRef> {
        let secondary = self
            .list_displays()
            .into_iter()
            .find(|d| d.role == DisplayRole::Secondary);

        match &secondary {
            Some(d) => log::debug!("[DISPLAY] Secondary display id {} ({})", d.id, d.name),
            None => log::info!("[DISPLAY] No secondary display attached"),
        }
        secondary
    }

    /// Id of the secondary surface, `None` when only the default one exists.
    pub fn secondary_display_id(&self) -> Option<u32> {
        self.secondary_display().map(|d| d.id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Failed to enumerate displays: {0}")]
    Enumeration(String),
}
