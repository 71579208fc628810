use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::models::Notification;

type Channels = HashMap<i64, broadcast::Sender<Notification>>;

/// Buffered events per connected user before slow readers start lagging
const CHANNEL_CAPACITY: usize = 64;

/// Per-user publish/subscribe hub for live notifications
///
/// Each user gets a broadcast channel on first subscription. Events are only
/// delivered to users with an open subscription; nothing is stored for later.
#[derive(Clone, Default)]
pub struct NotificationHub {
    channels: Arc<RwLock<Channels>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a subscription for `user_id`; dropping it ends the subscription
    pub async fn subscribe(&self, user_id: i64) -> Subscription {
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);

        tracing::debug!(user_id, subscribers = sender.receiver_count() + 1, "Notification subscription opened");

        Subscription {
            receiver: sender.subscribe(),
            user_id,
            channels: self.channels.clone(),
        }
    }

    /// Sends an event to every open subscription of `user_id`
    ///
    /// Returns the number of subscriptions reached, 0 when the user is not connected.
    pub async fn publish(&self, user_id: i64, notification: Notification) -> usize {
        let event = notification.event_name();

        let sent = {
            let channels = self.channels.read().await;
            match channels.get(&user_id) {
                Some(sender) => sender.send(notification).ok(),
                None => {
                    tracing::debug!(user_id, event, "User not connected, notification dropped");
                    return 0;
                }
            }
        };

        match sent {
            Some(count) => {
                tracing::info!(user_id, event, subscribers = count, "Notification published");
                count
            }
            None => {
                prune(&mut *self.channels.write().await, user_id, 0);
                tracing::debug!(user_id, event, "Stale notification channel pruned");
                0
            }
        }
    }

    /// Number of users with at least one open subscription
    pub async fn connected_users(&self) -> usize {
        self.channels.read().await.len()
    }
}

/// Removes the channel of `user_id` once no more than `held` receivers remain
fn prune(channels: &mut Channels, user_id: i64, held: usize) -> bool {
    let idle = channels
        .get(&user_id)
        .is_some_and(|sender| sender.receiver_count() <= held);
    if idle {
        channels.remove(&user_id);
    }
    idle
}

/// Open subscription to one user's notifications
///
/// Dropping the last subscription of a user removes the user's channel.
pub struct Subscription {
    receiver: broadcast::Receiver<Notification>,
    user_id: i64,
    channels: Arc<RwLock<Channels>>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Result<Notification, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Notification, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let user_id = self.user_id;

        // Our own receiver is still alive here
        if let Ok(mut channels) = self.channels.try_write() {
            if prune(&mut channels, user_id, 1) {
                tracing::debug!(user_id, "Notification channel closed");
            }
            return;
        }

        // Lock is busy; finish once this receiver is gone
        let channels = self.channels.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if prune(&mut *channels.write().await, user_id, 0) {
                    tracing::debug!(user_id, "Notification channel closed");
                }
            });
        }
    }
}
