use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::notify::NotifyError;
use crate::observer::traits::ObserverRing;

/// Observer failures. None of them can undo a committed transition.
#[derive(Debug, Error, Clone)]
pub enum ObserverError {
    #[error("Delivery error: {0}")]
    DeliveryError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("System error: {0}")]
    SystemError(String),
}

impl From<NotifyError> for ObserverError {
    fn from(error: NotifyError) -> Self {
        ObserverError::DeliveryError(error.to_string())
    }
}

/// Observer warnings (non-fatal issues)
#[derive(Debug, Clone, Serialize)]
pub struct ObserverWarning {
    pub observer: String,
    pub ring: u8,
    pub message: String,
}

impl ObserverWarning {
    pub fn new(observer: &str, ring: ObserverRing, message: String) -> Self {
        Self {
            observer: observer.to_string(),
            ring: ring.number(),
            message,
        }
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct ObserverReport {
    pub observers_run: usize,
    pub warnings: Vec<ObserverWarning>,
    pub execution_time: Duration,
}

impl ObserverReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
