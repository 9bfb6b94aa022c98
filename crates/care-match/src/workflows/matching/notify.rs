//! Asynchronous notification fan-out.
//!
//! Two independent outbound ports: a best-effort real-time channel to any
//! currently connected session, and a queue whose consumer retries delivery
//! out of band. Dispatch happens only after the triggering transition has
//! committed, and a failed signal never rolls it back.

use std::sync::Arc;

use tracing::warn;

use super::domain::{NotificationEvent, Recipient};

/// Real-time channel error.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("recipient has no connected session")]
    NotConnected,
    #[error("realtime transport unavailable: {0}")]
    Transport(String),
}

/// Queue error.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue transport unavailable: {0}")]
    Transport(String),
}

/// Fire-and-forget push to a recipient's live session. No delivery guarantee,
/// no retry.
pub trait RealtimeChannel: Send + Sync {
    fn send_to_user(
        &self,
        recipient: &Recipient,
        payload: &serde_json::Value,
    ) -> Result<(), RealtimeError>;
}

/// At-least-once hand-off for out-of-band processing (eventual email and the
/// like). Retries belong to the consumer, not to this dispatcher.
pub trait NotificationQueue: Send + Sync {
    fn enqueue(&self, payload: serde_json::Value) -> Result<(), QueueError>;
}

/// Fans a committed transition out to both ports. Signals are issued
/// independently; either may fail without affecting the other or the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    realtime: Arc<dyn RealtimeChannel>,
    queue: Arc<dyn NotificationQueue>,
    inline: bool,
}

impl NotificationDispatcher {
    pub fn new(realtime: Arc<dyn RealtimeChannel>, queue: Arc<dyn NotificationQueue>) -> Self {
        Self {
            realtime,
            queue,
            inline: false,
        }
    }

    /// Dispatcher that always issues signals inline, for callers that need
    /// delivery to have happened by the time `dispatch` returns (the CLI
    /// demo reads the queue right after its last step).
    pub fn blocking(realtime: Arc<dyn RealtimeChannel>, queue: Arc<dyn NotificationQueue>) -> Self {
        Self {
            realtime,
            queue,
            inline: true,
        }
    }

    /// Emit both signals for an event. Failures are logged and swallowed;
    /// this call never fails and never blocks on delivery. When a tokio
    /// runtime is present the signals run on spawned tasks, otherwise they
    /// are issued inline (CLI demo, synchronous tests).
    pub fn dispatch(&self, event: NotificationEvent) {
        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "notification event could not be serialized, dropping");
                return;
            }
        };

        let realtime = Arc::clone(&self.realtime);
        let queue = Arc::clone(&self.queue);
        let recipient = event.recipient.clone();
        let queue_payload = payload.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(_) if self.inline => {
                send_realtime(realtime.as_ref(), &recipient, &payload);
                enqueue(queue.as_ref(), queue_payload);
            }
            Ok(handle) => {
                let realtime_payload = payload;
                let realtime_recipient = recipient.clone();
                handle.spawn(async move {
                    send_realtime(realtime.as_ref(), &realtime_recipient, &realtime_payload);
                });
                handle.spawn(async move {
                    enqueue(queue.as_ref(), queue_payload);
                });
            }
            Err(_) => {
                send_realtime(realtime.as_ref(), &recipient, &payload);
                enqueue(queue.as_ref(), queue_payload);
            }
        }
    }
}

fn send_realtime(channel: &dyn RealtimeChannel, recipient: &Recipient, payload: &serde_json::Value) {
    if let Err(err) = channel.send_to_user(recipient, payload) {
        warn!(error = %err, ?recipient, "realtime notification dropped");
    }
}

fn enqueue(queue: &dyn NotificationQueue, payload: serde_json::Value) {
    if let Err(err) = queue.enqueue(payload) {
        warn!(error = %err, "notification enqueue failed, consumer will not see this event");
    }
}
