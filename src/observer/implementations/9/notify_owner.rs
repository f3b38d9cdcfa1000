// Ring 9: Notify Owner - tells the owner about a new final outcome
use async_trait::async_trait;
use std::sync::Arc;

use crate::notify::{NotificationDispatcher, NotifyError};
use crate::observer::context::TransitionEvent;
use crate::observer::error::ObserverError;
use crate::observer::traits::{ObserverRing, TransitionObserver};

pub struct NotifyOwner {
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl NotifyOwner {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl TransitionObserver for NotifyOwner {
    fn name(&self) -> &'static str {
        "NotifyOwner"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Notification
    }

    async fn execute(&self, event: &TransitionEvent) -> Result<(), ObserverError> {
        let Some(notification) = event.notification.clone() else {
            return Ok(());
        };

        match self.dispatcher.dispatch(notification).await {
            Ok(()) => Ok(()),
            Err(NotifyError::Disabled) => {
                tracing::debug!("Notifications disabled, owner of {} not notified", event.item.id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
