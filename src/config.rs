//! Persisted user settings and the ordered feature-zone list.
//!
//! Settings live in the platform config directory:
//!   macOS:   ~/Library/Application Support/dualshot/settings.json
//!   Linux:   ~/.config/dualshot/settings.json
//!   Windows: %APPDATA%/dualshot/settings.json
//!
//! The core never writes settings on its own. It reads a snapshot at startup
//! and re-reads it when a `ConfigReloaded` event arrives on the bus.

use crate::compose::{CompositionLayout, FrameColor, ImageQuality};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_OVERLAY_HEIGHT_DP: u32 = 24;
pub const MIN_OVERLAY_HEIGHT_DP: u32 = 5;
pub const MAX_OVERLAY_HEIGHT_DP: u32 = 50;

pub const DEFAULT_CAPTURE_DELAY_MS: u32 = 329;
pub const MIN_CAPTURE_DELAY_MS: u32 = 0;
pub const MAX_CAPTURE_DELAY_MS: u32 = 1000;

/// Upward travel needed before a swipe counts as a trigger.
pub const GESTURE_THRESHOLD_DP: f32 = 40.0;

/// The four built-in actions a gesture zone can be bound to.
///
/// `Secondary` captures the secondary display. Older settings files called
/// this entry "double screen"; it has always meant the second surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureAction {
    Primary,
    #[serde(alias = "double_screen", alias = "sub")]
    Secondary,
    Both,
    Home,
}

impl FeatureAction {
    pub const ALL: [FeatureAction; 4] = [
        FeatureAction::Primary,
        FeatureAction::Secondary,
        FeatureAction::Both,
        FeatureAction::Home,
    ];

    pub fn default_label(self) -> &'static str {
        match self {
            FeatureAction::Primary => "Capture main screen",
            FeatureAction::Secondary => "Capture sub screen",
            FeatureAction::Both => "Capture both screens",
            FeatureAction::Home => "Sub screen home",
        }
    }

    /// Zone color shown while preview mode is on.
    pub fn accent(self) -> AccentColor {
        match self {
            FeatureAction::Primary => AccentColor::new(0x42, 0x85, 0xF4),
            FeatureAction::Secondary => AccentColor::new(0x34, 0xA8, 0x53),
            FeatureAction::Both => AccentColor::new(0xFB, 0xBC, 0x05),
            FeatureAction::Home => AccentColor::new(0xEA, 0x43, 0x35),
        }
    }

    /// Whether triggering this action produces a screenshot.
    pub fn is_capture(self) -> bool {
        !matches!(self, FeatureAction::Home)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccentColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AccentColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for AccentColor {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

/// One entry of the ordered feature list shared by the settings UI and the
/// gesture strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureZone {
    pub id: String,
    pub label: String,
    pub action: FeatureAction,
    pub enabled: bool,
    #[serde(default)]
    pub accent: AccentColor,
}

impl FeatureZone {
    pub fn new(id: impl Into<String>, action: FeatureAction, enabled: bool) -> Self {
        Self {
            id: id.into(),
            label: action.default_label().to_string(),
            action,
            enabled,
            accent: action.accent(),
        }
    }
}

/// Factory list: three capture zones on, home off.
pub fn default_features() -> Vec<FeatureZone> {
    vec![
        FeatureZone::new("1", FeatureAction::Primary, true),
        FeatureZone::new("2", FeatureAction::Secondary, true),
        FeatureZone::new("3", FeatureAction::Both, true),
        FeatureZone::new("4", FeatureAction::Home, false),
    ]
}

/// Enforce the list invariants: one entry per action (first wins), a Home
/// entry always present, accent colors derived from the action.
pub fn normalize_features(features: Vec<FeatureZone>) -> Vec<FeatureZone> {
    let mut seen = Vec::with_capacity(FeatureAction::ALL.len());
    let mut out: Vec<FeatureZone> = Vec::with_capacity(features.len() + 1);

    for mut feature in features {
        if seen.contains(&feature.action) {
            log::warn!(
                "[CONFIG] Dropping duplicate {:?} feature (id {})",
                feature.action,
                feature.id
            );
            continue;
        }
        seen.push(feature.action);
        feature.accent = feature.action.accent();
        out.push(feature);
    }

    if !seen.contains(&FeatureAction::Home) {
        let id = (out.len() + 1).to_string();
        out.push(FeatureZone::new(id, FeatureAction::Home, false));
    }

    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Height of the gesture strip in density-independent units.
    #[serde(default = "default_overlay_height")]
    pub overlay_height_dp: u32,
    /// Pause between the primary and secondary capture of a dual shot.
    #[serde(default = "default_capture_delay")]
    pub capture_delay_ms: u32,
    #[serde(default)]
    pub frame_composite_enabled: bool,
    #[serde(default)]
    pub frame_color_index: u8,
    #[serde(default = "default_frame_quality")]
    pub frame_image_quality: u8,
    #[serde(default = "default_true")]
    pub sound_effect_enabled: bool,
    #[serde(default)]
    pub hide_from_recents: bool,
    #[serde(default = "default_features")]
    pub features: Vec<FeatureZone>,
}

fn default_overlay_height() -> u32 {
    DEFAULT_OVERLAY_HEIGHT_DP
}

fn default_capture_delay() -> u32 {
    DEFAULT_CAPTURE_DELAY_MS
}

fn default_frame_quality() -> u8 {
    ImageQuality::MAX_LEVEL
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            overlay_height_dp: default_overlay_height(),
            capture_delay_ms: default_capture_delay(),
            frame_composite_enabled: false,
            frame_color_index: 0,
            frame_image_quality: default_frame_quality(),
            sound_effect_enabled: true,
            hide_from_recents: false,
            features: default_features(),
        }
    }
}

impl Settings {
    /// Clamp every numeric field into its valid range and normalize the
    /// feature list.
    pub fn sanitized(mut self) -> Self {
        self.overlay_height_dp = self
            .overlay_height_dp
            .clamp(MIN_OVERLAY_HEIGHT_DP, MAX_OVERLAY_HEIGHT_DP);
        self.capture_delay_ms = self
            .capture_delay_ms
            .clamp(MIN_CAPTURE_DELAY_MS, MAX_CAPTURE_DELAY_MS);
        self.frame_color_index = self.frame_color_index.min(FrameColor::Purple.index());
        self.frame_image_quality = ImageQuality::new(self.frame_image_quality).level();
        self.features = normalize_features(std::mem::take(&mut self.features));
        self
    }

    pub fn capture_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.capture_delay_ms))
    }

    /// Layout used when both captures succeed.
    pub fn composition_layout(&self) -> CompositionLayout {
        if self.frame_composite_enabled {
            CompositionLayout::Framed {
                color: FrameColor::from_index(self.frame_color_index),
                quality: ImageQuality::new(self.frame_image_quality),
            }
        } else {
            CompositionLayout::Stacked
        }
    }

    /// Enabled features in list order.
    pub fn enabled_features(&self) -> Vec<FeatureZone> {
        self.features.iter().filter(|f| f.enabled).cloned().collect()
    }

    /// Move a feature to a new position. Ids travel with their entries.
    pub fn move_feature(&mut self, from: usize, to: usize) -> bool {
        if from >= self.features.len() || to >= self.features.len() {
            return false;
        }
        let item = self.features.remove(from);
        self.features.insert(to, item);
        true
    }

    pub fn set_feature_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.features.iter_mut().find(|f| f.id == id) {
            Some(feature) => {
                feature.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

/// Default location of the settings file.
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dualshot")
        .join("settings.json")
}

/// File-backed settings persistence.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_location() -> Self {
        Self::new(settings_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file. A missing file yields defaults.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "[CONFIG] No settings at {}, using defaults",
                    self.path.display()
                );
                return Ok(Settings::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let settings: Settings = serde_json::from_str(&raw)?;
        Ok(settings.sanitized())
    }

    /// Like [`load`](Self::load) but falls back to defaults on any error.
    pub fn load_or_default(&self) -> Settings {
        self.load().unwrap_or_else(|e| {
            log::warn!("[CONFIG] Failed to load settings: {}, using defaults", e);
            Settings::default()
        })
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&settings.clone().sanitized())?;
        std::fs::write(&self.path, json)?;
        log::info!("[CONFIG] Settings saved to {}", self.path.display());
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
