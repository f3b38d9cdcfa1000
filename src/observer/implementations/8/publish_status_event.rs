// Ring 8: Publish Status Event - feeds the realtime status change stream
use async_trait::async_trait;

use crate::notify::EventBus;
use crate::observer::context::TransitionEvent;
use crate::observer::error::ObserverError;
use crate::observer::traits::{ObserverRing, TransitionObserver};

pub struct PublishStatusEvent {
    bus: EventBus,
}

impl PublishStatusEvent {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl TransitionObserver for PublishStatusEvent {
    fn name(&self) -> &'static str {
        "PublishStatusEvent"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Integration
    }

    async fn execute(&self, event: &TransitionEvent) -> Result<(), ObserverError> {
        let receivers = self.bus.publish(event.status_changed());
        tracing::trace!("Status change of {} delivered to {} subscribers", event.item.id, receivers);
        Ok(())
    }
}
