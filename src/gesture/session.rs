//! Per-touch gesture state machine.
//!
//! A [`GestureSession`] is a value: each handler takes it by value and
//! returns the next session together with the effects the caller must carry
//! out. Nothing here touches a clock, a window or the bus.

use super::zones::GestureZoneModel;
use crate::config::FeatureAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Tracking,
    Triggered,
}

/// Live data of one touch interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    pub start_x: f32,
    pub start_y: f32,
    /// Upward displacement, `start_y - current_y`.
    pub displacement: f32,
    pub crossed: bool,
    /// Zone highlighted since the threshold was crossed.
    pub zone: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEffect {
    /// Run the appear animation on the icon for `zone`.
    ShowIcon { zone: usize, action: FeatureAction },
    /// Run the reverse animation, then detach the icon.
    HideIcon,
    /// Run the confirm animation, then detach the icon.
    ConfirmIcon,
    PlaySound,
    Trigger(FeatureAction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: GestureSession,
    pub effects: Vec<GestureEffect>,
}

impl Transition {
    fn quiet(session: GestureSession) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }

    /// The action triggered by this transition, if any.
    pub fn triggered(&self) -> Option<FeatureAction> {
        self.effects.iter().find_map(|e| match e {
            GestureEffect::Trigger(action) => Some(*action),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    phase: Phase,
    state: Option<GestureState>,
    threshold_px: f32,
    sound_enabled: bool,
}

impl GestureSession {
    pub fn new(threshold_px: f32, sound_enabled: bool) -> Self {
        Self {
            phase: Phase::Idle,
            state: None,
            threshold_px,
            sound_enabled,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Option<&GestureState> {
        self.state.as_ref()
    }

    pub fn threshold_px(&self) -> f32 {
        self.threshold_px
    }

    fn reset(self) -> Self {
        Self::new(self.threshold_px, self.sound_enabled)
    }

    pub fn touch_down(self, x: f32, y: f32, zones: &GestureZoneModel) -> Transition {
        if zones.is_hidden() {
            return Transition::quiet(self.reset());
        }

        let mut effects = Vec::new();
        if self.phase == Phase::Triggered {
            effects.push(GestureEffect::HideIcon);
        }

        Transition {
            session: Self {
                phase: Phase::Tracking,
                state: Some(GestureState {
                    start_x: x,
                    start_y: y,
                    displacement: 0.0,
                    crossed: false,
                    zone: None,
                }),
                ..self
            },
            effects,
        }
    }

    pub fn touch_move(self, _x: f32, y: f32, zones: &GestureZoneModel) -> Transition {
        let Some(mut state) = self.state else {
            return Transition::quiet(self);
        };

        state.displacement = state.start_y - y;
        let above = state.displacement > self.threshold_px;
        let mut effects = Vec::new();

        let phase = match (self.phase, above) {
            (Phase::Tracking, true) => match zones.section_index(state.start_x) {
                Some(index) => {
                    state.crossed = true;
                    state.zone = Some(index);
                    if let Some(zone) = zones.zone(index) {
                        effects.push(GestureEffect::ShowIcon {
                            zone: index,
                            action: zone.action,
                        });
                    }
                    Phase::Triggered
                }
                None => Phase::Tracking,
            },
            (Phase::Triggered, false) => {
                state.crossed = false;
                state.zone = None;
                effects.push(GestureEffect::HideIcon);
                Phase::Tracking
            }
            (phase, _) => phase,
        };

        Transition {
            session: Self {
                phase,
                state: Some(state),
                ..self
            },
            effects,
        }
    }

    /// Finger lifted at `(x, y)`. Dropping back under the threshold on the
    /// way up counts as a retreat, not a trigger.
    pub fn touch_up(self, x: f32, y: f32, zones: &GestureZoneModel) -> Transition {
        if self.state.is_none() {
            return Transition::quiet(self.reset());
        }
        let Transition {
            session,
            mut effects,
        } = self.touch_move(x, y, zones);
        // A crossing on the final event alone has shown no icon and must not
        // fire.
        if self.phase != Phase::Triggered {
            effects.retain(|e| !matches!(e, GestureEffect::ShowIcon { .. }));
            return Transition {
                session: session.reset(),
                effects,
            };
        }
        let mut finished = session.finish(zones);
        effects.append(&mut finished.effects);
        Transition {
            session: finished.session,
            effects,
        }
    }

    /// Touch stream interrupted. Resolved on the last known position.
    pub fn touch_cancel(self, zones: &GestureZoneModel) -> Transition {
        self.finish(zones)
    }

    fn finish(self, zones: &GestureZoneModel) -> Transition {
        let mut effects = Vec::new();
        let action = match (self.phase, self.state.and_then(|s| s.zone)) {
            (Phase::Triggered, Some(index)) => zones.zone(index).map(|z| z.action),
            _ => None,
        };

        if let Some(action) = action {
            effects.push(GestureEffect::ConfirmIcon);
            if self.sound_enabled && action != FeatureAction::Home {
                effects.push(GestureEffect::PlaySound);
            }
            effects.push(GestureEffect::Trigger(action));
            log::info!("[GESTURE] Triggered {:?}", action);
        } else if self.phase == Phase::Triggered {
            effects.push(GestureEffect::HideIcon);
        }

        Transition {
            session: self.reset(),
            effects,
        }
    }
}
