//! Progress reporting for specification runs

use crate::types::CovarianceType;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Milestones emitted while a batch of specifications is processed
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A specification is about to be estimated
    Estimating {
        specification: String,
        covariance: CovarianceType,
    },
    /// Every specification has been estimated
    EstimationDone { specifications: usize },
    /// Fitted models are being turned into table rows
    ExtractingResults,
}

/// Receiver of [`ProgressEvent`]s
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

impl<T: ProgressObserver + ?Sized> ProgressObserver for &T {
    fn on_event(&self, event: &ProgressEvent) {
        (**self).on_event(event)
    }
}

impl<T: ProgressObserver + ?Sized> ProgressObserver for Arc<T> {
    fn on_event(&self, event: &ProgressEvent) {
        (**self).on_event(event)
    }
}

/// Default observer: logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Estimating {
                specification,
                covariance,
            } => info!(
                specification = %specification,
                covariance = %covariance,
                "Estimating specification"
            ),
            ProgressEvent::EstimationDone { specifications } => {
                info!(specifications, "Estimation done")
            }
            ProgressEvent::ExtractingResults => info!("Extracting results"),
        }
    }
}

/// Observer that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_event(&self, event: &ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
