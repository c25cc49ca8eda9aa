//! Worker-side bus subscriber. Turns trigger events into capture requests
//! and keeps the orchestrator's settings snapshot current.

use crate::bus::{BusEvent, BusSubscriber};
use crate::config::SettingsStore;
use crate::orchestrator::{CaptureOrchestrator, CaptureReport, CaptureRequest, Submission};
use tokio::sync::mpsc;

pub struct CaptureService {
    orchestrator: CaptureOrchestrator,
    settings: SettingsStore,
    reports: Option<mpsc::UnboundedSender<CaptureReport>>,
}

impl CaptureService {
    pub fn new(orchestrator: CaptureOrchestrator, settings: SettingsStore) -> Self {
        Self {
            orchestrator,
            settings,
            reports: None,
        }
    }

    /// Also deliver every finished report on `sink`.
    pub fn with_report_sink(mut self, sink: mpsc::UnboundedSender<CaptureReport>) -> Self {
        self.reports = Some(sink);
        self
    }

    pub fn orchestrator(&self) -> &CaptureOrchestrator {
        &self.orchestrator
    }

    /// Serve events until the bus closes.
    pub async fn run(&self, mut events: BusSubscriber) {
        log::info!("[BUS] Capture service listening");
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        log::info!("[BUS] Trigger bus closed, capture service stopping");
    }

    /// Must be called from within a tokio runtime.
    pub fn handle(&self, event: BusEvent) {
        if let Some(action) = event.action() {
            match self.orchestrator.submit(CaptureRequest::now(action)) {
                Submission::Started(handle) => {
                    let sink = self.reports.clone();
                    tokio::spawn(async move {
                        match handle.await {
                            Ok(report) => forward(sink.as_ref(), report),
                            Err(e) => log::error!("[CAPTURE] Capture task failed: {}", e),
                        }
                    });
                }
                Submission::Rejected(report) => forward(self.reports.as_ref(), report),
            }
            return;
        }

        match event {
            BusEvent::ConfigReloaded => {
                let settings = self.settings.load_or_default();
                self.orchestrator.update_settings(&settings);
            }
            BusEvent::PreviewModeChanged(enabled) => {
                log::debug!("[BUS] Preview mode {} (handled by the strip)", enabled);
            }
            _ => {}
        }
    }
}

fn forward(sink: Option<&mpsc::UnboundedSender<CaptureReport>>, report: CaptureReport) {
    if let Some(sink) = sink {
        if sink.send(report).is_err() {
            log::debug!("[CAPTURE] Report sink closed");
        }
    }
}
