// Observer pipeline for committed transitions. Rings run in order, the
// observers of one ring run concurrently, each under its own timeout.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::notify::{EventBus, NotificationDispatcher};
use crate::observer::context::TransitionEvent;
use crate::observer::error::{ObserverError, ObserverReport, ObserverWarning};
use crate::observer::implementations::{NotifyOwner, PublishStatusEvent};
use crate::observer::traits::{ObserverRing, TransitionObserver};

pub struct ObserverPipeline {
    observers: HashMap<ObserverRing, Vec<Arc<dyn TransitionObserver>>>,
    /// Upper bound applied on top of each observer's own timeout
    max_timeout: Option<Duration>,
}

impl ObserverPipeline {
    /// Create new observer pipeline with empty observer registry
    pub fn new() -> Self {
        Self {
            observers: HashMap::new(),
            max_timeout: None,
        }
    }

    /// Event feed plus owner notifications
    pub fn standard(bus: EventBus, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        let mut pipeline = Self::new();
        pipeline.register_observer(Arc::new(PublishStatusEvent::new(bus)));
        pipeline.register_observer(Arc::new(NotifyOwner::new(dispatcher)));
        pipeline
    }

    pub fn with_max_timeout(mut self, max_timeout: Duration) -> Self {
        self.max_timeout = Some(max_timeout);
        self
    }

    pub fn register_observer(&mut self, observer: Arc<dyn TransitionObserver>) {
        let ring = observer.ring();
        let name = observer.name();
        self.observers.entry(ring).or_default().push(observer);

        tracing::debug!("Registered observer '{}' for ring {:?}", name, ring);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.values().map(Vec::len).sum()
    }

    fn effective_timeout(&self, observer: &dyn TransitionObserver) -> Duration {
        match self.max_timeout {
            Some(max) => observer.timeout().min(max),
            None => observer.timeout(),
        }
    }

    /// Run every applicable observer. Never fails; problems come back as warnings.
    pub async fn run(&self, event: &TransitionEvent) -> ObserverReport {
        let start_time = Instant::now();
        let mut report = ObserverReport::default();

        for ring in ObserverRing::ORDER {
            let Some(observers) = self.observers.get(&ring) else {
                tracing::trace!("No observers registered for ring {:?}", ring);
                continue;
            };

            let applicable: Vec<&Arc<dyn TransitionObserver>> = observers
                .iter()
                .filter(|observer| observer.applies_to(event.item.kind))
                .collect();

            tracing::debug!("Executing ring {:?} with {} observers", ring, applicable.len());
            report.observers_run += applicable.len();

            let outcomes = join_all(applicable.into_iter().map(|observer| self.run_one(&**observer, event))).await;
            report.warnings.extend(outcomes.into_iter().flatten());
        }

        report.execution_time = start_time.elapsed();
        report
    }

    async fn run_one(&self, observer: &dyn TransitionObserver, event: &TransitionEvent) -> Option<ObserverWarning> {
        let limit = self.effective_timeout(observer);
        let observer_start = Instant::now();

        let error = match timeout(limit, observer.execute(event)).await {
            Ok(Ok(())) => {
                tracing::debug!(
                    "Observer: {} completed successfully in {:?}",
                    observer.name(),
                    observer_start.elapsed()
                );
                return None;
            }
            Ok(Err(error)) => error,
            Err(_elapsed) => {
                ObserverError::TimeoutError(format!("Observer {} timed out after {:?}", observer.name(), limit))
            }
        };

        tracing::warn!(
            work_item = %event.item.id,
            "Observer: {} failed in {:?}: {}",
            observer.name(),
            observer_start.elapsed(),
            error
        );
        Some(ObserverWarning::new(observer.name(), observer.ring(), error.to_string()))
    }
}

impl Default for ObserverPipeline {
    fn default() -> Self {
        Self::new()
    }
}
