use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::attention::SlaPolicy;
use crate::services::review::ReviewService;

/// Periodically raise SLA signals for pending work items. A zero interval
/// disables the monitor.
pub fn spawn(service: Arc<ReviewService>, policy: SlaPolicy, every: Duration) -> Option<JoinHandle<()>> {
    if every.is_zero() {
        tracing::info!("SLA monitor disabled");
        return None;
    }

    tracing::info!(
        "SLA monitor running every {:?} (review window {}h)",
        every,
        policy.review_hours
    );

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match service.sla_scan(Utc::now(), policy).await {
                Ok(signals) if !signals.is_empty() => {
                    tracing::info!("SLA scan raised {} attention signals", signals.len());
                }
                Ok(_) => tracing::debug!("SLA scan found nothing new"),
                Err(e) => tracing::error!("SLA scan failed: {}", e),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::observer::ObserverPipeline;
    use crate::services::ReviewSettings;

    #[tokio::test]
    async fn zero_interval_disables_the_monitor() {
        let service = Arc::new(ReviewService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(ObserverPipeline::new()),
            ReviewSettings::default(),
        ));
        assert!(spawn(service, SlaPolicy::new(24), Duration::ZERO).is_none());
    }
}
