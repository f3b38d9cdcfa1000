// GET /api/events - server-sent stream of committed status changes
//
// Actors without team or global visibility only receive events for their own
// work items.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

use crate::access::{can, Capability};
use crate::middleware::AuthUser;
use crate::server::AppState;

pub async fn events_stream(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let actor_id = actor.id;
    let sees_all = can(&actor, Capability::ViewTeamWork) || can(&actor, Capability::ViewAllWork);
    let receiver = state.bus.subscribe();

    tracing::debug!("Actor {} subscribed to status events", actor_id);

    let events = stream::unfold(receiver, move |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) if sees_all || event.owner_id == actor_id => {
                    match Event::default().event("status_changed").json_data(&event) {
                        Ok(sse) => return Some((Ok(sse), receiver)),
                        Err(e) => tracing::warn!("Failed to encode status event: {}", e),
                    }
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event subscriber {} lagged, {} events dropped", actor_id, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
