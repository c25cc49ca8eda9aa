//! End-to-end: a swipe on the strip reaches the capture worker through the
//! trigger bus and produces a report.

mod common;

use common::*;
use dualshot_lib::bus::{BusEvent, TriggerBus};
use dualshot_lib::compose::Encoding;
use dualshot_lib::config::{FeatureAction, Settings, SettingsStore};
use dualshot_lib::display::DisplayRegistry;
use dualshot_lib::gesture::{GestureOverlay, SoundCue, TouchEvent};
use dualshot_lib::orchestrator::CaptureReport;
use dualshot_lib::service::CaptureService;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Default)]
struct CountingSound(AtomicUsize);

impl SoundCue for CountingSound {
    fn play(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct Flow {
    harness: Harness,
    bus: TriggerBus,
    overlay: GestureOverlay,
    sound: Arc<CountingSound>,
    store: SettingsStore,
    reports: mpsc::UnboundedReceiver<CaptureReport>,
}

fn start(name: &str) -> Flow {
    let settings = fast_settings();
    let harness = Harness::new(name, &settings);
    let store = SettingsStore::new(harness.dir.join("config").join("settings.json"));
    store.save(&settings).unwrap();

    let bus = TriggerBus::new();
    let (tx, reports) = mpsc::unbounded_channel();
    let service =
        CaptureService::new(harness.orchestrator.clone(), store.clone()).with_report_sink(tx);
    let events = bus.subscribe();
    tokio::spawn(async move { service.run(events).await });

    let surface = DisplayRegistry::new(harness.displays.clone())
        .secondary_display()
        .unwrap();
    let sound = Arc::new(CountingSound::default());
    let overlay = GestureOverlay::new(&surface, &settings, bus.clone(), sound.clone());

    Flow {
        harness,
        bus,
        overlay,
        sound,
        store,
        reports,
    }
}

fn swipe(overlay: &mut GestureOverlay, x: f32) -> Option<FeatureAction> {
    let now = Instant::now();
    overlay.handle_touch(TouchEvent::Down { x, y: 300.0 }, now);
    overlay.handle_touch(TouchEvent::Move { x, y: 200.0 }, now);
    overlay.handle_touch(TouchEvent::Up { x, y: 200.0 }, now)
}

/// Framed composites are slow in unoptimised builds.
const REPORT_TIMEOUT: Duration = Duration::from_secs(30);

async fn next_report(flow: &mut Flow) -> CaptureReport {
    tokio::time::timeout(REPORT_TIMEOUT, flow.reports.recv())
        .await
        .expect("report in time")
        .expect("service alive")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn swipe_on_middle_zone_captures_secondary() {
    let mut flow = start("flow-secondary");
    // 1200px strip, three zones of 400px.
    assert_eq!(swipe(&mut flow.overlay, 600.0), Some(FeatureAction::Secondary));

    let report = next_report(&mut flow).await;
    assert_eq!(report.action, FeatureAction::Secondary);
    assert_eq!(report.message, "secondary captured");
    assert_eq!(flow.sound.0.load(Ordering::SeqCst), 1);
    assert_eq!(flow.harness.saved_files().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn short_swipe_does_nothing() {
    let mut flow = start("flow-short");
    let now = Instant::now();
    flow.overlay.handle_touch(TouchEvent::Down { x: 100.0, y: 300.0 }, now);
    flow.overlay.handle_touch(TouchEvent::Move { x: 100.0, y: 280.0 }, now);
    assert_eq!(
        flow.overlay.handle_touch(TouchEvent::Up { x: 100.0, y: 280.0 }, now),
        None
    );

    let waited = tokio::time::timeout(Duration::from_millis(200), flow.reports.recv()).await;
    assert!(waited.is_err(), "no report expected");
    assert!(flow.harness.backend.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn config_reload_reaches_both_contexts() {
    let mut flow = start("flow-reload");

    let mut settings = flow.store.load().unwrap();
    settings.frame_composite_enabled = true;
    settings.frame_image_quality = 9;
    settings.set_feature_enabled("1", false);
    settings.set_feature_enabled("2", false);
    flow.store.save(&settings).unwrap();

    let mut overlay_events = flow.bus.subscribe();
    flow.bus.publish(BusEvent::ConfigReloaded);
    flow.overlay.pump(&mut overlay_events, &flow.store);

    // Only "both" is left; it now spans the whole strip.
    assert_eq!(flow.overlay.zones().len(), 1);
    assert_eq!(swipe(&mut flow.overlay, 50.0), Some(FeatureAction::Both));

    let report = next_report(&mut flow).await;
    assert_eq!(report.message, "dual captured");
    assert_eq!(
        report.artifact().unwrap().encoding,
        Encoding::Jpeg { quality: 90 }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn preview_toggle_on_bus_colors_strip() {
    let mut flow = start("flow-preview");
    let mut overlay_events = flow.bus.subscribe();
    flow.bus.publish(BusEvent::PreviewModeChanged(true));
    flow.overlay.pump(&mut overlay_events, &flow.store);

    assert!(flow.overlay.preview_mode());
    assert!(flow.overlay.zone_colors().iter().all(Option::is_some));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn home_zone_does_not_play_sound() {
    let mut flow = start("flow-home");
    let mut settings = Settings::default();
    settings.capture_delay_ms = 0;
    settings.features.iter_mut().for_each(|f| f.enabled = f.action == FeatureAction::Home);
    flow.overlay.apply_settings(&settings);

    assert_eq!(swipe(&mut flow.overlay, 10.0), Some(FeatureAction::Home));
    let report = next_report(&mut flow).await;
    assert_eq!(report.message, "secondary returned to home");
    assert_eq!(flow.sound.0.load(Ordering::SeqCst), 0);
    assert_eq!(flow.harness.launcher.calls(), vec![SECONDARY_ID]);
}
