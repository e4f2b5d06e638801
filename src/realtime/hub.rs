use std::collections::HashMap;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::realtime::protocol::ServerEvent;

/// A handle to push events to one connected subscriber.
#[derive(Debug, Clone)]
pub struct SubscriberHandle {
    pub user_id: Uuid,
    pub sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Manages the live subscriptions of all negotiation channels, one room per
/// session id.
///
/// A room only ever holds the session's two participants (membership is
/// verified against the session row before `join` is called), so a
/// broadcast reaches exactly the pair, on however many devices each of
/// them is connected.
pub struct NegotiationHub {
    /// session_id -> connected subscriber handles
    rooms: RwLock<HashMap<Uuid, Vec<SubscriberHandle>>>,
}

impl NegotiationHub {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Register a subscriber on a session's channel.
    /// Returns the receiver the WebSocket session should drain.
    pub async fn join(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = SubscriberHandle { user_id, sender: tx };

        let presence = ServerEvent::Presence {
            user_id,
            online: true,
        };

        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(session_id).or_insert_with(Vec::new);

        // Tell the counterpart this user came online, before adding the
        // new handle so the joiner does not receive its own presence.
        for subscriber in room.iter() {
            if subscriber.user_id != user_id {
                let _ = subscriber.sender.send(presence.clone());
            }
        }

        room.push(handle);

        rx
    }

    /// Drop one of a user's subscriptions on a session's channel.
    pub async fn leave(&self, session_id: Uuid, user_id: Uuid) {
        let mut rooms = self.rooms.write().await;

        if let Some(room) = rooms.get_mut(&session_id) {
            // A user may hold several connections; remove one.
            if let Some(pos) = room.iter().position(|s| s.user_id == user_id) {
                room.remove(pos);
            }

            let still_connected = room.iter().any(|s| s.user_id == user_id);

            if !still_connected {
                let presence = ServerEvent::Presence {
                    user_id,
                    online: false,
                };
                for subscriber in room.iter() {
                    let _ = subscriber.sender.send(presence.clone());
                }
            }

            if room.is_empty() {
                rooms.remove(&session_id);
            }
        }
    }

    /// Push an event to every subscriber of a session's channel.
    ///
    /// Fire-and-forget: a send to a dropped receiver means that socket is
    /// gone and `leave` will clean it up; the durable state this event
    /// describes has already committed either way.
    pub async fn broadcast(&self, session_id: Uuid, event: ServerEvent) {
        let rooms = self.rooms.read().await;
        if let Some(room) = rooms.get(&session_id) {
            for subscriber in room {
                let _ = subscriber.sender.send(event.clone());
            }
        }
    }
}

impl Default for NegotiationHub {
    fn default() -> Self {
        Self::new()
    }
}
