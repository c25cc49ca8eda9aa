//! Feedback icon animation curves. Pure sampling, no timers.
//!
//! The overlay drives the [`Animator`] from its own tick; an animation is
//! just a start instant and a kind, sampled on demand.

use std::time::{Duration, Instant};

pub const APPEAR_DURATION: Duration = Duration::from_millis(250);
pub const REVERSE_DURATION: Duration = Duration::from_millis(200);
pub const CONFIRM_GROW_DURATION: Duration = Duration::from_millis(100);
pub const CONFIRM_SHRINK_DURATION: Duration = Duration::from_millis(200);

/// Peak scale of the confirm pulse.
pub const CONFIRM_PEAK_SCALE: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    /// `1 - (1 - t)^(2f)`
    Decelerate(f32),
    /// `t^(2f)`
    Accelerate(f32),
    /// Cosine ease in and out.
    AccelerateDecelerate,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Decelerate(f) => 1.0 - (1.0 - t).powf(2.0 * f),
            Easing::Accelerate(f) => t.powf(2.0 * f),
            Easing::AccelerateDecelerate => ((t + 1.0) * std::f32::consts::PI).cos() / 2.0 + 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// Fade in while sliding up into place.
    Appear,
    /// Fade out while sliding back down.
    Reverse,
    /// Pulse then fade out.
    Confirm,
}

impl AnimationKind {
    pub fn duration(self) -> Duration {
        match self {
            AnimationKind::Appear => APPEAR_DURATION,
            AnimationKind::Reverse => REVERSE_DURATION,
            AnimationKind::Confirm => CONFIRM_GROW_DURATION + CONFIRM_SHRINK_DURATION,
        }
    }

    /// Whether the icon surface is detached once the animation ends.
    pub fn removes_icon(self) -> bool {
        !matches!(self, AnimationKind::Appear)
    }
}

/// Visual state of the icon at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconFrame {
    pub alpha: f32,
    /// Downward offset in pixels from the resting position.
    pub translate_y: f32,
    pub scale: f32,
}

impl IconFrame {
    pub const RESTING: IconFrame = IconFrame {
        alpha: 1.0,
        translate_y: 0.0,
        scale: 1.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackAnimation {
    kind: AnimationKind,
    started_at: Instant,
    /// Slide distance in pixels.
    slide_px: f32,
}

impl FeedbackAnimation {
    pub fn new(kind: AnimationKind, started_at: Instant, slide_px: f32) -> Self {
        Self {
            kind,
            started_at,
            slide_px,
        }
    }

    pub fn kind(&self) -> AnimationKind {
        self.kind
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.kind.duration()
    }

    pub fn sample(&self, now: Instant) -> IconFrame {
        let elapsed = now.saturating_duration_since(self.started_at);
        match self.kind {
            AnimationKind::Appear => {
                let p = Easing::Decelerate(2.0).apply(progress(elapsed, APPEAR_DURATION));
                IconFrame {
                    alpha: p,
                    translate_y: self.slide_px * (1.0 - p),
                    scale: 1.0,
                }
            }
            AnimationKind::Reverse => {
                let p = Easing::Accelerate(1.5).apply(progress(elapsed, REVERSE_DURATION));
                IconFrame {
                    alpha: 1.0 - p,
                    translate_y: self.slide_px * p,
                    scale: 1.0,
                }
            }
            AnimationKind::Confirm => {
                if elapsed < CONFIRM_GROW_DURATION {
                    let p = Easing::AccelerateDecelerate
                        .apply(progress(elapsed, CONFIRM_GROW_DURATION));
                    IconFrame {
                        alpha: 1.0,
                        translate_y: 0.0,
                        scale: 1.0 + (CONFIRM_PEAK_SCALE - 1.0) * p,
                    }
                } else {
                    let p = Easing::AccelerateDecelerate.apply(progress(
                        elapsed - CONFIRM_GROW_DURATION,
                        CONFIRM_SHRINK_DURATION,
                    ));
                    IconFrame {
                        alpha: 1.0 - p,
                        translate_y: 0.0,
                        scale: CONFIRM_PEAK_SCALE - (CONFIRM_PEAK_SCALE - 1.0) * p,
                    }
                }
            }
        }
    }
}

fn progress(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / total.as_secs_f32()).min(1.0)
}

/// Result of advancing the animator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTick {
    pub frame: IconFrame,
    /// Set on the tick where the running animation completed.
    pub finished: Option<AnimationKind>,
}

/// Runs at most one animation at a time.
#[derive(Debug, Default)]
pub struct Animator {
    current: Option<FeedbackAnimation>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `kind`, cancelling whatever was running. Returns the cancelled
    /// animation's kind.
    pub fn start(&mut self, kind: AnimationKind, now: Instant, slide_px: f32) -> Option<AnimationKind> {
        let cancelled = self.cancel();
        self.current = Some(FeedbackAnimation::new(kind, now, slide_px));
        cancelled
    }

    pub fn cancel(&mut self) -> Option<AnimationKind> {
        let cancelled = self.current.take().map(|a| a.kind());
        if let Some(kind) = cancelled {
            log::debug!("[GESTURE] Cancelled {:?} animation", kind);
        }
        cancelled
    }

    pub fn current(&self) -> Option<&FeedbackAnimation> {
        self.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Sample the running animation, clearing it once finished.
    pub fn tick(&mut self, now: Instant) -> Option<AnimationTick> {
        let animation = self.current?;
        let frame = animation.sample(now);
        let finished = if animation.is_finished(now) {
            self.current = None;
            Some(animation.kind())
        } else {
            None
        };
        Some(AnimationTick { frame, finished })
    }
}
