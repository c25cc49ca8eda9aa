//! Process-local trigger channel between the gesture strip and the capture
//! worker.
//!
//! Backed by a `tokio::sync::broadcast` channel. Publishing never blocks and
//! never fails; an event with no subscriber is dropped.

use crate::config::FeatureAction;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

pub const DEFAULT_BUS_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    CapturePrimary,
    CaptureSecondary,
    CaptureBoth,
    GoHome,
    PreviewModeChanged(bool),
    ConfigReloaded,
}

impl BusEvent {
    /// The trigger event for a zone action.
    pub fn trigger(action: FeatureAction) -> Self {
        match action {
            FeatureAction::Primary => BusEvent::CapturePrimary,
            FeatureAction::Secondary => BusEvent::CaptureSecondary,
            FeatureAction::Both => BusEvent::CaptureBoth,
            FeatureAction::Home => BusEvent::GoHome,
        }
    }

    /// The action a trigger event asks for. `None` for control events.
    pub fn action(self) -> Option<FeatureAction> {
        match self {
            BusEvent::CapturePrimary => Some(FeatureAction::Primary),
            BusEvent::CaptureSecondary => Some(FeatureAction::Secondary),
            BusEvent::CaptureBoth => Some(FeatureAction::Both),
            BusEvent::GoHome => Some(FeatureAction::Home),
            BusEvent::PreviewModeChanged(_) | BusEvent::ConfigReloaded => None,
        }
    }
}

#[derive(Clone)]
pub struct TriggerBus {
    tx: broadcast::Sender<BusEvent>,
}

impl TriggerBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns the number of subscribers that will see the event.
    pub fn publish(&self, event: BusEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => {
                log::debug!("[BUS] {:?} -> {} subscriber(s)", event, receivers);
                receivers
            }
            Err(_) => {
                log::debug!("[BUS] {:?} dropped, no subscribers", event);
                0
            }
        }
    }

    pub fn subscribe(&self) -> BusSubscriber {
        BusSubscriber {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for TriggerBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BusSubscriber {
    rx: broadcast::Receiver<BusEvent>,
}

impl BusSubscriber {
    /// Next event, or `None` once every publisher is gone. Lag is logged and
    /// skipped over.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("[BUS] Subscriber lagged, {} event(s) skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll for the UI context.
    pub fn try_recv(&mut self) -> Option<BusEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("[BUS] Subscriber lagged, {} event(s) skipped", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
