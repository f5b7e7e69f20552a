//! Event transport seam: broadcasts, session lookups, connection control.

use crate::models::{ParticipantId, RoomEvent, Session};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// What a tournament room needs from the real-time transport layer.
///
/// Calls are non-blocking; a transport queues outbound work rather than waiting on sockets.
pub trait RoomTransport: Send + Sync {
    /// Broadcast to every member of the room.
    fn emit(&self, event: &RoomEvent);

    /// Look up the session of a participant in a channel namespace.
    fn session(&self, namespace: &str, participant: ParticipantId) -> Option<Session>;

    /// Close the room's broadcast channel.
    fn close_room(&self);

    fn disconnect(&self, participant: ParticipantId);
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<(String, ParticipantId), Session>,
    events: Vec<RoomEvent>,
    disconnected: Vec<ParticipantId>,
    closed: bool,
}

/// Transport that keeps everything in memory. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct MemoryTransport {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_session(&self, namespace: &str, session: Session) {
        if let Ok(mut g) = self.inner.write() {
            g.sessions
                .insert((namespace.to_string(), session.participant), session);
        }
    }

    /// Forget a participant's session, as when its socket drops.
    pub fn drop_session(&self, namespace: &str, participant: ParticipantId) {
        if let Ok(mut g) = self.inner.write() {
            g.sessions.remove(&(namespace.to_string(), participant));
        }
    }

    /// Every event emitted so far, in order.
    pub fn events(&self) -> Vec<RoomEvent> {
        self.inner
            .read()
            .map(|g| g.events.clone())
            .unwrap_or_default()
    }

    pub fn disconnected(&self) -> Vec<ParticipantId> {
        self.inner
            .read()
            .map(|g| g.disconnected.clone())
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.read().map(|g| g.closed).unwrap_or(false)
    }
}

impl RoomTransport for MemoryTransport {
    fn emit(&self, event: &RoomEvent) {
        if let Ok(mut g) = self.inner.write() {
            if g.closed {
                log::warn!("Dropping {} on a closed room", event.name());
                return;
            }
            g.events.push(event.clone());
        }
    }

    fn session(&self, namespace: &str, participant: ParticipantId) -> Option<Session> {
        self.inner
            .read()
            .ok()?
            .sessions
            .get(&(namespace.to_string(), participant))
            .cloned()
    }

    fn close_room(&self) {
        if let Ok(mut g) = self.inner.write() {
            g.closed = true;
        }
    }

    fn disconnect(&self, participant: ParticipantId) {
        if let Ok(mut g) = self.inner.write() {
            if !g.disconnected.contains(&participant) {
                g.disconnected.push(participant);
            }
            g.sessions.retain(|(_, p), _| *p != participant);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn sessions_are_scoped_by_namespace() {
        let transport = MemoryTransport::new();
        let id = Uuid::new_v4();
        transport.register_session("/tournament", Session::new(id, "alice"));
        assert_eq!(
            transport.session("/tournament", id).map(|s| s.display_name),
            Some("alice".to_string())
        );
        assert!(transport.session("/duel", id).is_none());
    }

    #[test]
    fn closed_room_drops_events_and_disconnect_clears_session() {
        let transport = MemoryTransport::new();
        let id = Uuid::new_v4();
        transport.register_session("/tournament", Session::new(id, "bob"));
        transport.close_room();
        transport.emit(&RoomEvent::UpdateGameScore {
            left_user_score: 1,
            right_user_score: 0,
        });
        transport.disconnect(id);
        transport.disconnect(id);
        assert!(transport.events().is_empty());
        assert_eq!(transport.disconnected(), vec![id]);
        assert!(transport.session("/tournament", id).is_none());
    }
}
