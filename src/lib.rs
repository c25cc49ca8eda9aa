//! DualShot: dual-display screenshot assistant.
//!
//! Library layout:
//! - Display enumeration (display/)
//! - Single-display capture with readiness and timeout (capture/)
//! - Stacked and framed composition (compose/)
//! - Capture pipeline with single-flight guard (orchestrator.rs)
//! - Gesture strip: zones, sessions, feedback animation (gesture/)
//! - Trigger bus and the worker that serves it (bus.rs, service.rs)
//!
//! `run()` is the desktop CLI: one trigger per invocation.

pub mod bus;
pub mod capture;
pub mod compose;
pub mod config;
pub mod desktop;
pub mod display;
pub mod gesture;
pub mod orchestrator;
pub mod service;
pub mod storage;

use bus::{BusEvent, TriggerBus};
use capture::{CaptureCapability, FrameCaptureAdapter, XcapScreenshotBackend};
use compose::{CompositionEngine, DirectoryFrameAssets};
use config::{FeatureAction, SettingsStore};
use desktop::{ConsoleNotifier, LogMediaIndex, TerminalBell, UnsupportedHomeLauncher};
use display::{DisplayRegistry, XcapDisplayBackend};
use gesture::SoundCue;
use orchestrator::{CaptureOrchestrator, OrchestratorParts};
use service::CaptureService;
use std::sync::Arc;
use storage::{default_pictures_dir, ArtifactStore};
use tokio::sync::mpsc;

const USAGE: &str = "usage: dualshot <main|sub|both|home|displays>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Trigger(FeatureAction),
    Displays,
}

impl Command {
    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "main" | "primary" => Some(Command::Trigger(FeatureAction::Primary)),
            "sub" | "secondary" => Some(Command::Trigger(FeatureAction::Secondary)),
            "both" | "dual" => Some(Command::Trigger(FeatureAction::Both)),
            "home" => Some(Command::Trigger(FeatureAction::Home)),
            "displays" => Some(Command::Displays),
            _ => None,
        }
    }
}

/// Entry point, called by the `dualshot` binary.
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(command) = std::env::args().nth(1).as_deref().and_then(Command::parse) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    let code = match command {
        Command::Displays => list_displays(),
        Command::Trigger(action) => runtime.block_on(trigger(action)),
    };
    std::process::exit(code);
}

fn list_displays() -> i32 {
    let registry = DisplayRegistry::new(Arc::new(XcapDisplayBackend));
    let displays = registry.list_displays();
    for d in &displays {
        println!(
            "{}\t{:?}\t{:?}\t{}x{}\t@{}\t{}",
            d.id, d.role, d.liveness, d.width, d.height, d.density.0, d.name
        );
    }
    if displays.is_empty() {
        1
    } else {
        0
    }
}

/// Publish one trigger and wait for its report.
async fn trigger(action: FeatureAction) -> i32 {
    log::info!("DualShot starting up");

    let store = SettingsStore::at_default_location();
    let settings = store.load_or_default();

    // xcap needs no privileged service; the capability is live immediately.
    let capability = Arc::new(CaptureCapability::new(true));
    capability.connect();

    let parts = OrchestratorParts {
        registry: DisplayRegistry::new(Arc::new(XcapDisplayBackend)),
        capability: capability.clone(),
        adapter: FrameCaptureAdapter::new(Arc::new(XcapScreenshotBackend), capability),
        engine: CompositionEngine::new(Arc::new(
            DirectoryFrameAssets::at_default_location().with_builtin_fallback(),
        )),
        store: ArtifactStore::new(default_pictures_dir(), Arc::new(LogMediaIndex)),
        notifier: Arc::new(ConsoleNotifier),
        launcher: Arc::new(UnsupportedHomeLauncher),
    };
    let orchestrator = CaptureOrchestrator::new(parts, &settings);

    let (reports_tx, mut reports_rx) = mpsc::unbounded_channel();
    let service = CaptureService::new(orchestrator, store).with_report_sink(reports_tx);

    let bus = TriggerBus::new();
    let events = bus.subscribe();
    let worker = tokio::spawn(async move { service.run(events).await });

    if action.is_capture() && settings.sound_effect_enabled {
        TerminalBell.play();
    }
    bus.publish(BusEvent::trigger(action));

    let report = reports_rx.recv().await;
    drop(bus);
    if let Err(e) = worker.await {
        log::error!("Capture service task failed: {}", e);
    }

    match report {
        Some(report) if report.is_success() => 0,
        _ => 1,
    }
}
