//! The gesture strip controller on the UI context.
//!
//! Owns the zone layout, the current [`GestureSession`], the feedback icon
//! and its [`Animator`]. Touch events and animation ticks arrive here one at
//! a time; triggers leave through the [`TriggerBus`].

use super::animation::{AnimationKind, Animator, IconFrame};
use super::session::{GestureEffect, GestureSession};
use super::zones::GestureZoneModel;
use crate::bus::{BusEvent, BusSubscriber, TriggerBus};
use crate::config::{AccentColor, FeatureAction, Settings, SettingsStore, GESTURE_THRESHOLD_DP};
use crate::display::{Density, DisplaySurfaceRef};
use std::sync::Arc;
use std::time::Instant;

/// Icon window edge, large enough for the confirm pulse.
pub const ICON_WINDOW_DP: f32 = 80.0;
pub const ICON_SIZE_DP: f32 = 48.0;
/// Gap between the icon window and the bottom edge.
pub const ICON_BOTTOM_MARGIN_DP: f32 = 4.0;
/// Distance the icon slides while appearing and retreating.
pub const ICON_SLIDE_DP: f32 = 30.0;

/// Short audio cue played with a capture trigger.
pub trait SoundCue {
    fn play(&self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    Cancel,
}

/// Where the icon window sits, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconPlacement {
    /// Left edge of the window.
    pub x: f32,
    /// Offset of the window's bottom edge from the screen bottom.
    pub bottom: f32,
    pub window_size: f32,
    pub icon_size: f32,
}

/// The single reusable feedback icon surface.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackIcon {
    pub action: FeatureAction,
    pub placement: IconPlacement,
    pub frame: IconFrame,
    pub attached: bool,
}

pub struct GestureOverlay {
    bus: TriggerBus,
    sound: Arc<dyn SoundCue>,
    density: Density,
    width_px: u32,
    settings: Settings,
    zones: GestureZoneModel,
    session: GestureSession,
    animator: Animator,
    icon: Option<FeedbackIcon>,
    icon_surfaces_created: usize,
    preview: bool,
}

impl GestureOverlay {
    pub fn new(
        surface: &DisplaySurfaceRef,
        settings: &Settings,
        bus: TriggerBus,
        sound: Arc<dyn SoundCue>,
    ) -> Self {
        let density = surface.density;
        let zones = GestureZoneModel::new(surface.width, &settings.features);
        log::info!(
            "[GESTURE] Strip on display {}: {}px wide, {} zone(s)",
            surface.id,
            surface.width,
            zones.len()
        );
        Self {
            bus,
            sound,
            density,
            width_px: surface.width,
            settings: settings.clone(),
            session: new_session(density, settings),
            zones,
            animator: Animator::new(),
            icon: None,
            icon_surfaces_created: 0,
            preview: false,
        }
    }

    /// Swap in a new settings snapshot. An in-progress gesture is dropped.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        self.zones = GestureZoneModel::new(self.width_px, &settings.features);
        self.session = new_session(self.density, settings);
        if self.animator.cancel().is_some() {
            self.detach_icon();
        }
        log::info!(
            "[GESTURE] Settings applied: {} zone(s), strip {}px high",
            self.zones.len(),
            self.strip_height_px()
        );
    }

    pub fn zones(&self) -> &GestureZoneModel {
        &self.zones
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    pub fn is_visible(&self) -> bool {
        !self.zones.is_hidden()
    }

    pub fn strip_height_px(&self) -> u32 {
        self.density.dp_to_px(self.settings.overlay_height_dp as f32) as u32
    }

    pub fn preview_mode(&self) -> bool {
        self.preview
    }

    pub fn set_preview_mode(&mut self, enabled: bool) {
        if self.preview != enabled {
            log::debug!("[GESTURE] Preview mode {}", if enabled { "on" } else { "off" });
            self.preview = enabled;
        }
    }

    /// Fill color of every zone, left to right. `None` is transparent.
    pub fn zone_colors(&self) -> Vec<Option<AccentColor>> {
        (0..self.zones.len())
            .map(|i| self.zones.zone_color(i, self.preview))
            .collect()
    }

    pub fn icon(&self) -> Option<&FeedbackIcon> {
        self.icon.as_ref()
    }

    pub fn icon_surfaces_created(&self) -> usize {
        self.icon_surfaces_created
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Feed one touch event. Returns the triggered action, if any.
    pub fn handle_touch(&mut self, event: TouchEvent, now: Instant) -> Option<FeatureAction> {
        let session = self.session;
        let transition = match event {
            TouchEvent::Down { x, y } => session.touch_down(x, y, &self.zones),
            TouchEvent::Move { x, y } => session.touch_move(x, y, &self.zones),
            TouchEvent::Up { x, y } => session.touch_up(x, y, &self.zones),
            TouchEvent::Cancel => session.touch_cancel(&self.zones),
        };
        self.session = transition.session;

        let triggered = transition.triggered();
        for effect in transition.effects {
            self.apply(effect, now);
        }
        triggered
    }

    /// Advance the icon animation.
    pub fn tick(&mut self, now: Instant) -> Option<IconFrame> {
        let tick = self.animator.tick(now)?;
        if let Some(icon) = self.icon.as_mut() {
            icon.frame = tick.frame;
        }
        if tick.finished.map_or(false, AnimationKind::removes_icon) {
            self.detach_icon();
        }
        Some(tick.frame)
    }

    /// React to control events from the bus. Triggers are not ours.
    pub fn handle_bus_event(&mut self, event: BusEvent, store: &SettingsStore) {
        match event {
            BusEvent::PreviewModeChanged(enabled) => self.set_preview_mode(enabled),
            BusEvent::ConfigReloaded => self.apply_settings(&store.load_or_default()),
            _ => {}
        }
    }

    /// Drain pending bus events without blocking.
    pub fn pump(&mut self, events: &mut BusSubscriber, store: &SettingsStore) {
        while let Some(event) = events.try_recv() {
            self.handle_bus_event(event, store);
        }
    }

    fn apply(&mut self, effect: GestureEffect, now: Instant) {
        let slide = self.density.dp_to_px(ICON_SLIDE_DP);
        match effect {
            GestureEffect::ShowIcon { zone, action } => {
                let Some(center) = self.zones.icon_center_x(zone) else {
                    return;
                };
                let placement = self.placement(center);
                let icon = self.icon_surface();
                icon.action = action;
                icon.placement = placement;
                icon.frame = IconFrame {
                    alpha: 0.0,
                    translate_y: slide,
                    scale: 1.0,
                };
                icon.attached = true;
                self.animator.start(AnimationKind::Appear, now, slide);
            }
            GestureEffect::HideIcon => {
                if self.icon_attached() {
                    self.animator.start(AnimationKind::Reverse, now, slide);
                }
            }
            GestureEffect::ConfirmIcon => {
                if self.icon_attached() {
                    self.animator.start(AnimationKind::Confirm, now, slide);
                }
            }
            GestureEffect::PlaySound => self.sound.play(),
            GestureEffect::Trigger(action) => {
                self.bus.publish(BusEvent::trigger(action));
            }
        }
    }

    fn placement(&self, center_x: f32) -> IconPlacement {
        let window_size = self.density.dp_to_px(ICON_WINDOW_DP);
        IconPlacement {
            x: center_x - window_size / 2.0,
            bottom: self.density.dp_to_px(ICON_BOTTOM_MARGIN_DP),
            window_size,
            icon_size: self.density.dp_to_px(ICON_SIZE_DP),
        }
    }

    /// The icon surface, created on first use.
    fn icon_surface(&mut self) -> &mut FeedbackIcon {
        if self.icon.is_none() {
            self.icon_surfaces_created += 1;
            log::debug!("[GESTURE] Created feedback icon surface");
        }
        self.icon.get_or_insert(FeedbackIcon {
            action: FeatureAction::Primary,
            placement: IconPlacement {
                x: 0.0,
                bottom: 0.0,
                window_size: 0.0,
                icon_size: 0.0,
            },
            frame: IconFrame::RESTING,
            attached: false,
        })
    }

    fn icon_attached(&self) -> bool {
        self.icon.as_ref().map_or(false, |i| i.attached)
    }

    fn detach_icon(&mut self) {
        if let Some(icon) = self.icon.as_mut() {
            icon.attached = false;
        }
    }
}

fn new_session(density: Density, settings: &Settings) -> GestureSession {
    GestureSession::new(
        density.dp_to_px(GESTURE_THRESHOLD_DP),
        settings.sound_effect_enabled,
    )
}
