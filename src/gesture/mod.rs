//! Gesture strip on the secondary display.
//!
//! - `zones`: enabled features → equal-width zones (pure)
//! - `session`: per-touch state machine (pure)
//! - `animation`: feedback icon curves (pure)
//! - `overlay`: UI-context controller that wires the above to the bus

pub mod animation;
pub mod overlay;
pub mod session;
pub mod zones;

pub use animation::{AnimationKind, Animator, FeedbackAnimation, IconFrame};
pub use overlay::{FeedbackIcon, GestureOverlay, IconPlacement, SoundCue, TouchEvent};
pub use session::{GestureEffect, GestureSession, GestureState, Phase, Transition};
pub use zones::{GestureZoneModel, Zone};
