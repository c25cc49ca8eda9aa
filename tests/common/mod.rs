//! In-memory platform fakes shared by the integration tests.

#![allow(dead_code)]

use dualshot_lib::capture::{
    CaptureCallback, CaptureCapability, ColorSpace, FrameCaptureAdapter, HardwareFrame,
    PixelBuffer, ScreenshotBackend,
};
use dualshot_lib::compose::{ComposeError, CompositionEngine, FrameAssets, FrameColor};
use dualshot_lib::config::Settings;
use dualshot_lib::display::{DisplayBackend, DisplayError, DisplayInfo, DisplayRegistry};
use dualshot_lib::orchestrator::{CaptureOrchestrator, HomeLauncher, Notifier, OrchestratorParts};
use dualshot_lib::storage::{ArtifactStore, MediaIndex};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const PRIMARY_ID: u32 = 1;
pub const SECONDARY_ID: u32 = 2;

pub const MAIN_COLOR: Rgba<u8> = Rgba([200, 30, 30, 255]);
pub const SUB_COLOR: Rgba<u8> = Rgba([30, 30, 200, 255]);

// ── Displays ────────────────────────────────────────────────────────

pub struct FakeDisplays {
    displays: Mutex<Vec<DisplayInfo>>,
}

impl FakeDisplays {
    pub fn dual() -> Arc<Self> {
        Arc::new(Self {
            displays: Mutex::new(vec![
                display(PRIMARY_ID, 1920, 1080),
                display(SECONDARY_ID, 1200, 1600),
            ]),
        })
    }

    pub fn detach_secondary(&self) {
        self.displays.lock().unwrap().retain(|d| d.id == PRIMARY_ID);
    }
}

fn display(id: u32, width: u32, height: u32) -> DisplayInfo {
    DisplayInfo {
        id,
        name: format!("display-{}", id),
        width,
        height,
        scale_factor: 1.0,
    }
}

impl DisplayBackend for FakeDisplays {
    fn enumerate(&self) -> Result<Vec<DisplayInfo>, DisplayError> {
        Ok(self.displays.lock().unwrap().clone())
    }

    fn default_display_id(&self) -> u32 {
        PRIMARY_ID
    }
}

// ── Capture ─────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub enum Script {
    Image { width: u32, height: u32, color: Rgba<u8> },
    Hardware { width: u32, height: u32, color: Rgba<u8> },
    Fail(i32),
    Hold,
}

struct GpuFrame {
    width: u32,
    height: u32,
    color: Rgba<u8>,
}

impl HardwareFrame for GpuFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn read_back(&self) -> Result<RgbaImage, String> {
        Ok(RgbaImage::from_pixel(self.width, self.height, self.color))
    }
}

/// Answers each display id according to its script, on a separate thread.
pub struct ScriptedBackend {
    scripts: Mutex<HashMap<u32, Script>>,
    held: Mutex<Vec<(u32, CaptureCallback)>>,
    calls: Mutex<Vec<(u32, Instant)>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self {
            scripts: Mutex::new(HashMap::new()),
            held: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        };
        backend.script(
            PRIMARY_ID,
            Script::Image {
                width: 1920,
                height: 1080,
                color: MAIN_COLOR,
            },
        );
        backend.script(
            SECONDARY_ID,
            Script::Image {
                width: 1200,
                height: 1600,
                color: SUB_COLOR,
            },
        );
        Arc::new(backend)
    }

    pub fn script(&self, display_id: u32, script: Script) {
        self.scripts.lock().unwrap().insert(display_id, script);
    }

    pub fn calls(&self) -> Vec<(u32, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn held_count(&self) -> usize {
        self.held.lock().unwrap().len()
    }

    /// Answer a held request.
    pub fn release(&self, display_id: u32, width: u32, height: u32, color: Rgba<u8>) {
        let callback = {
            let mut held = self.held.lock().unwrap();
            let pos = held
                .iter()
                .position(|(id, _)| *id == display_id)
                .expect("no held request for display");
            held.remove(pos).1
        };
        callback(Ok(PixelBuffer::from_rgba(
            RgbaImage::from_pixel(width, height, color),
            ColorSpace::Srgb,
        )));
    }
}

impl ScreenshotBackend for ScriptedBackend {
    fn take_screenshot(&self, display_id: u32, callback: CaptureCallback) {
        self.calls.lock().unwrap().push((display_id, Instant::now()));
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&display_id)
            .copied()
            .unwrap_or(Script::Fail(4));

        match script {
            Script::Image { width, height, color } => {
                std::thread::spawn(move || {
                    callback(Ok(PixelBuffer::from_rgba(
                        RgbaImage::from_pixel(width, height, color),
                        ColorSpace::Srgb,
                    )))
                });
            }
            Script::Hardware { width, height, color } => {
                std::thread::spawn(move || {
                    callback(Ok(PixelBuffer::from_hardware(
                        Box::new(GpuFrame { width, height, color }),
                        ColorSpace::DisplayP3,
                    )))
                });
            }
            Script::Fail(code) => {
                std::thread::spawn(move || callback(Err(code)));
            }
            Script::Hold => self.held.lock().unwrap().push((display_id, callback)),
        }
    }
}

// ── Reporting and persistence ───────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingIndex {
    pub count: AtomicUsize,
}

impl MediaIndex for RecordingIndex {
    fn notify_written(&self, _path: &Path) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeLauncher {
    result: Result<(), String>,
    calls: Mutex<Vec<u32>>,
}

impl FakeLauncher {
    pub fn new(result: Result<(), String>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

impl HomeLauncher for FakeLauncher {
    fn go_home(&self, display_id: u32) -> Result<(), String> {
        self.calls.lock().unwrap().push(display_id);
        self.result.clone()
    }
}

/// Transparent backgrounds of a configurable size.
pub struct FakeFrames {
    size: (u32, u32),
    requested: Mutex<Vec<FrameColor>>,
}

impl FakeFrames {
    pub fn new(size: (u32, u32)) -> Arc<Self> {
        Arc::new(Self {
            size,
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn requested(&self) -> Vec<FrameColor> {
        self.requested.lock().unwrap().clone()
    }
}

impl FrameAssets for FakeFrames {
    fn background(&self, color: FrameColor) -> Result<RgbaImage, ComposeError> {
        self.requested.lock().unwrap().push(color);
        Ok(RgbaImage::new(self.size.0, self.size.1))
    }
}

// ── Harness ─────────────────────────────────────────────────────────

pub struct Harness {
    pub orchestrator: CaptureOrchestrator,
    pub displays: Arc<FakeDisplays>,
    pub backend: Arc<ScriptedBackend>,
    pub capability: Arc<CaptureCapability>,
    pub notifier: Arc<RecordingNotifier>,
    pub index: Arc<RecordingIndex>,
    pub launcher: Arc<FakeLauncher>,
    pub frames: Arc<FakeFrames>,
    pub dir: PathBuf,
}

impl Harness {
    pub fn new(name: &str, settings: &Settings) -> Self {
        Self::build(name, settings, true)
    }

    pub fn not_ready(name: &str, settings: &Settings) -> Self {
        Self::build(name, settings, false)
    }

    fn build(name: &str, settings: &Settings, connected: bool) -> Self {
        let dir = scratch_dir(name);
        let displays = FakeDisplays::dual();
        let backend = ScriptedBackend::new();
        let capability = Arc::new(CaptureCapability::new(true));
        if connected {
            capability.connect();
        }
        let notifier = Arc::new(RecordingNotifier::default());
        let index = Arc::new(RecordingIndex::default());
        let launcher = FakeLauncher::new(Ok(()));
        let frames = FakeFrames::new((400, 300));

        let parts = OrchestratorParts {
            registry: DisplayRegistry::new(displays.clone()),
            capability: capability.clone(),
            adapter: FrameCaptureAdapter::new(backend.clone(), capability.clone())
                .with_timeout(Duration::from_secs(2)),
            engine: CompositionEngine::new(frames.clone()),
            store: ArtifactStore::new(&dir, index.clone()),
            notifier: notifier.clone(),
            launcher: launcher.clone(),
        };

        Self {
            orchestrator: CaptureOrchestrator::new(parts, settings),
            displays,
            backend,
            capability,
            notifier,
            index,
            launcher,
            frames,
            dir,
        }
    }

    /// Swap the home launcher result by rebuilding with a failing one.
    pub fn with_failing_launcher(name: &str, settings: &Settings, reason: &str) -> Self {
        let mut harness = Self::new(name, settings);
        let launcher = FakeLauncher::new(Err(reason.to_string()));
        let parts = OrchestratorParts {
            registry: DisplayRegistry::new(harness.displays.clone()),
            capability: harness.capability.clone(),
            adapter: FrameCaptureAdapter::new(harness.backend.clone(), harness.capability.clone()),
            engine: CompositionEngine::new(harness.frames.clone()),
            store: ArtifactStore::new(&harness.dir, harness.index.clone()),
            notifier: harness.notifier.clone(),
            launcher: launcher.clone(),
        };
        harness.orchestrator = CaptureOrchestrator::new(parts, settings);
        harness.launcher = launcher;
        harness
    }

    pub fn saved_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dualshot-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Settings with no inter-capture pause.
pub fn fast_settings() -> Settings {
    Settings {
        capture_delay_ms: 0,
        ..Settings::default()
    }
}

/// Poll until `cond` holds or two seconds pass.
pub async fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
