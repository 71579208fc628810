use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures_util::stream::{self, Stream};
use std::{convert::Infallible, sync::Arc};
use tokio::sync::broadcast::error::RecvError;

use crate::{middleware::RequestId, routes::AppState, session::Session};

/// Server-Sent Events stream of the caller's notifications
///
/// The subscription lives as long as the connection; closing it releases the
/// caller's channel in the hub.
pub async fn stream(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.notifications.subscribe(session.user_id).await;

    tracing::info!(request_id = %request_id, user_id = session.user_id, "Notification stream opened");

    let events = stream::unfold(subscription, |mut subscription| async move {
        let user_id = subscription.user_id();
        loop {
            match subscription.recv().await {
                Ok(notification) => {
                    match Event::default()
                        .event(notification.event_name())
                        .json_data(&notification)
                    {
                        Ok(event) => return Some((Ok::<_, Infallible>(event), subscription)),
                        Err(e) => tracing::warn!(error = %e, user_id, "Failed to encode notification"),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id, skipped, "Notification stream lagging, events skipped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
