//! Capture pipeline: readiness → capture(s) → compose → persist → report.
//!
//! At most one request runs at a time. A request arriving while another is
//! in flight is rejected on the spot with `Busy`; nothing is queued. Every
//! path, including rejection, ends in exactly one report to the notifier.

use crate::capture::{CaptureCapability, CaptureError, FrameCaptureAdapter, PixelBuffer};
use crate::compose::{CompositionEngine, CompositionLayout, ComposeError};
use crate::config::{FeatureAction, Settings};
use crate::display::DisplayRegistry;
use crate::storage::{Artifact, ArtifactKind, ArtifactStore, ArtifactTag, SoloReason, StoreError};
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Receives the user-facing result text of every request.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Sends the secondary surface back to its launcher.
pub trait HomeLauncher: Send + Sync {
    fn go_home(&self, display_id: u32) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub action: FeatureAction,
    pub submitted_at: DateTime<Local>,
}

impl CaptureRequest {
    pub fn now(action: FeatureAction) -> Self {
        Self {
            action,
            submitted_at: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    ValidatingReadiness,
    CapturingPrimary,
    DelayingBeforeSecondary,
    CapturingSecondary,
    Composing,
    Persisting,
    Aborted,
}

#[derive(Debug)]
pub enum Outcome {
    Saved(Artifact),
    ReturnedHome { display_id: u32 },
}

#[derive(Debug)]
pub struct CaptureReport {
    pub action: FeatureAction,
    pub outcome: Result<Outcome, PipelineError>,
    pub message: String,
}

impl CaptureReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match &self.outcome {
            Ok(Outcome::Saved(artifact)) => Some(artifact),
            _ => None,
        }
    }
}

pub enum Submission {
    /// The request holds the pipeline; the handle yields its report.
    Started(JoinHandle<CaptureReport>),
    /// Another request was in flight.
    Rejected(CaptureReport),
}

/// Collaborators the orchestrator drives.
pub struct OrchestratorParts {
    pub registry: DisplayRegistry,
    pub capability: Arc<CaptureCapability>,
    pub adapter: FrameCaptureAdapter,
    pub engine: CompositionEngine,
    pub store: ArtifactStore,
    pub notifier: Arc<dyn Notifier>,
    pub launcher: Arc<dyn HomeLauncher>,
}

/// Per-request configuration snapshot.
#[derive(Debug, Clone, Copy)]
struct PipelineConfig {
    delay: Duration,
    layout: CompositionLayout,
}

impl From<&Settings> for PipelineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            delay: settings.capture_delay(),
            layout: settings.composition_layout(),
        }
    }
}

struct Inner {
    parts: OrchestratorParts,
    busy: AtomicBool,
    state: Mutex<OrchestratorState>,
    config: Mutex<PipelineConfig>,
}

impl Inner {
    fn state_lock(&self) -> MutexGuard<'_, OrchestratorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, next: OrchestratorState) {
        let mut state = self.state_lock();
        if *state != next {
            log::debug!("[CAPTURE] {:?} -> {:?}", *state, next);
            *state = next;
        }
    }
}

/// Releases the single-flight slot and returns to `Idle` when dropped.
struct BusyGuard {
    inner: Arc<Inner>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.transition(OrchestratorState::Idle);
        self.inner.busy.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct CaptureOrchestrator {
    inner: Arc<Inner>,
}

impl CaptureOrchestrator {
    pub fn new(parts: OrchestratorParts, settings: &Settings) -> Self {
        Self {
            inner: Arc::new(Inner {
                parts,
                busy: AtomicBool::new(false),
                state: Mutex::new(OrchestratorState::Idle),
                config: Mutex::new(PipelineConfig::from(settings)),
            }),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        *self.inner.state_lock()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    /// Replace the configuration snapshot. A request already running keeps
    /// the snapshot it started with.
    pub fn update_settings(&self, settings: &Settings) {
        let config = PipelineConfig::from(settings);
        log::info!(
            "[CONFIG] Capture settings reloaded: delay {}ms, layout {:?}",
            config.delay.as_millis(),
            config.layout
        );
        *self
            .inner
            .config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    }

    /// Start a request on its own task. Must be called inside a tokio runtime.
    pub fn submit(&self, request: CaptureRequest) -> Submission {
        match self.try_begin() {
            Some(guard) => {
                let this = self.clone();
                Submission::Started(tokio::spawn(async move { this.run(request, guard).await }))
            }
            None => Submission::Rejected(self.reject(request)),
        }
    }

    /// Run a request to completion on the calling task.
    pub async fn execute(&self, request: CaptureRequest) -> CaptureReport {
        match self.try_begin() {
            Some(guard) => self.run(request, guard).await,
            None => self.reject(request),
        }
    }

    fn try_begin(&self) -> Option<BusyGuard> {
        self.inner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                inner: self.inner.clone(),
            })
    }

    fn reject(&self, request: CaptureRequest) -> CaptureReport {
        log::warn!("[CAPTURE] {:?} rejected: pipeline busy", request.action);
        self.report(request.action, Err(PipelineError::Busy))
    }

    async fn run(&self, request: CaptureRequest, guard: BusyGuard) -> CaptureReport {
        let start = Instant::now();
        log::info!(
            "[CAPTURE] {:?} request submitted at {}",
            request.action,
            request.submitted_at.format("%H:%M:%S%.3f")
        );

        let config = *self
            .inner
            .config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let outcome = self.pipeline(request.action, config).await;
        if outcome.is_err() {
            self.inner.transition(OrchestratorState::Aborted);
        }
        drop(guard);

        log::info!(
            "[CAPTURE] {:?} finished in {}ms",
            request.action,
            start.elapsed().as_millis()
        );
        self.report(request.action, outcome)
    }

    fn report(&self, action: FeatureAction, outcome: Result<Outcome, PipelineError>) -> CaptureReport {
        let message = report_message(action, &outcome);
        match &outcome {
            Ok(_) => log::info!("[CAPTURE] {}", message),
            Err(e) => log::warn!("[CAPTURE] {} ({})", message, e),
        }
        self.inner.parts.notifier.notify(&message);
        CaptureReport {
            action,
            outcome,
            message,
        }
    }

    async fn pipeline(
        &self,
        action: FeatureAction,
        config: PipelineConfig,
    ) -> Result<Outcome, PipelineError> {
        let parts = &self.inner.parts;

        self.inner.transition(OrchestratorState::ValidatingReadiness);
        parts
            .capability
            .ensure_ready()
            .map_err(CaptureError::from)?;

        match action {
            FeatureAction::Home => self.return_home(),
            FeatureAction::Primary => {
                self.inner.transition(OrchestratorState::CapturingPrimary);
                let main = parts.adapter.capture(parts.registry.primary_display_id()).await?;
                self.finish(
                    CompositionLayout::Stacked,
                    Some(main),
                    None,
                    ArtifactKind::Main,
                    ArtifactTag::Regular,
                )
                .await
            }
            FeatureAction::Secondary => {
                let display_id = parts
                    .registry
                    .secondary_display_id()
                    .ok_or(CaptureError::DisplayNotFound)?;
                self.inner.transition(OrchestratorState::CapturingSecondary);
                let sub = parts.adapter.capture(display_id).await?;
                self.finish(
                    CompositionLayout::Stacked,
                    None,
                    Some(sub),
                    ArtifactKind::Sub,
                    ArtifactTag::Regular,
                )
                .await
            }
            FeatureAction::Both => self.dual(config).await,
        }
    }

    async fn dual(&self, config: PipelineConfig) -> Result<Outcome, PipelineError> {
        let parts = &self.inner.parts;

        self.inner.transition(OrchestratorState::CapturingPrimary);
        let main = parts.adapter.capture(parts.registry.primary_display_id()).await?;

        self.inner.transition(OrchestratorState::DelayingBeforeSecondary);
        if !config.delay.is_zero() {
            tokio::time::sleep(config.delay).await;
        }

        let Some(display_id) = parts.registry.secondary_display_id() else {
            return self.solo(main, SoloReason::NoSecondaryDisplay).await;
        };

        self.inner.transition(OrchestratorState::CapturingSecondary);
        match parts.adapter.capture(display_id).await {
            Ok(sub) => {
                self.finish(
                    config.layout,
                    Some(main),
                    Some(sub),
                    ArtifactKind::Both,
                    ArtifactTag::Regular,
                )
                .await
            }
            Err(e) => {
                log::warn!("[CAPTURE] Secondary capture failed during dual shot: {}", e);
                self.solo(main, SoloReason::SecondaryCaptureFailed).await
            }
        }
    }

    /// Persist the primary capture alone after a partial dual failure.
    async fn solo(&self, main: PixelBuffer, reason: SoloReason) -> Result<Outcome, PipelineError> {
        self.finish(
            CompositionLayout::Stacked,
            Some(main),
            None,
            ArtifactKind::Main,
            ArtifactTag::Solo(reason),
        )
        .await
    }

    /// Compose and persist on a blocking worker.
    async fn finish(
        &self,
        layout: CompositionLayout,
        main: Option<PixelBuffer>,
        sub: Option<PixelBuffer>,
        kind: ArtifactKind,
        tag: ArtifactTag,
    ) -> Result<Outcome, PipelineError> {
        let inner = self.inner.clone();
        let dual = main.is_some() && sub.is_some();

        tokio::task::spawn_blocking(move || -> Result<Outcome, PipelineError> {
            inner.transition(if dual {
                OrchestratorState::Composing
            } else {
                OrchestratorState::Persisting
            });
            let composed = inner.parts.engine.compose(layout, main, sub)?;

            inner.transition(OrchestratorState::Persisting);
            let artifact = inner.parts.store.save(&composed, kind, tag)?;
            Ok(Outcome::Saved(artifact))
        })
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))?
    }

    fn return_home(&self) -> Result<Outcome, PipelineError> {
        let parts = &self.inner.parts;
        let display_id = parts
            .registry
            .secondary_display_id()
            .ok_or(CaptureError::DisplayNotFound)?;
        parts
            .launcher
            .go_home(display_id)
            .map_err(PipelineError::Home)?;
        Ok(Outcome::ReturnedHome { display_id })
    }
}

fn report_message(action: FeatureAction, outcome: &Result<Outcome, PipelineError>) -> String {
    match outcome {
        Ok(Outcome::ReturnedHome { .. }) => "secondary returned to home".to_string(),
        Ok(Outcome::Saved(artifact)) => match artifact.tag {
            ArtifactTag::Solo(SoloReason::NoSecondaryDisplay) => {
                "no secondary display detected, saved primary only".to_string()
            }
            ArtifactTag::Solo(SoloReason::SecondaryCaptureFailed) => {
                "secondary capture failed, saved primary only".to_string()
            }
            ArtifactTag::Regular => match action {
                FeatureAction::Primary => "primary captured",
                FeatureAction::Secondary => "secondary captured",
                FeatureAction::Both | FeatureAction::Home => "dual captured",
            }
            .to_string(),
        },
        Err(PipelineError::Busy) => "capture service busy".to_string(),
        Err(PipelineError::Capture(CaptureError::CapabilityUnavailable(e))) => e.to_string(),
        Err(PipelineError::Capture(CaptureError::DisplayNotFound)) => {
            "no secondary display detected".to_string()
        }
        Err(PipelineError::Capture(_)) => match action {
            FeatureAction::Secondary => "secondary capture failed".to_string(),
            _ => "primary capture failed".to_string(),
        },
        Err(PipelineError::Home(reason)) => format!("return to home failed: {}", reason),
        Err(e @ (PipelineError::Composition(_) | PipelineError::Persist(_) | PipelineError::Worker(_))) => {
            format!("screenshot not saved: {}", e)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Another capture is in flight")]
    Busy,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Composition failed: {0}")]
    Composition(#[from] ComposeError),

    #[error("Persist failed: {0}")]
    Persist(#[from] StoreError),

    #[error("Return to home failed: {0}")]
    Home(String),

    #[error("Capture worker failed: {0}")]
    Worker(String),
}
