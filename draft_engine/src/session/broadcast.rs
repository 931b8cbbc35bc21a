//! Post-commit notification of draft actions.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::mpsc;

use crate::draft::{DraftAction, DraftSession, SessionId};

/// A committed action together with the session state it produced
#[derive(Debug, Clone)]
pub struct DraftEvent {
    pub action: DraftAction,
    pub session: Arc<DraftSession>,
}

/// Receives every committed action exactly once, after the commit.
///
/// Delivery is fire-and-forget: implementations must not block and have no
/// way to fail the action that triggered them.
pub trait DraftBroadcaster: Send + Sync {
    fn action_committed(&self, event: &DraftEvent);
}

/// In-process fan-out to per-session subscriber channels
#[derive(Debug)]
pub struct SubscriberHub {
    capacity: usize,
    subscribers: Mutex<HashMap<SessionId, Vec<mpsc::Sender<DraftEvent>>>>,
}

impl SubscriberHub {
    /// # Arguments
    ///
    /// * `capacity` - Events buffered per subscriber before new ones are dropped
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Register a subscriber for a session's events.
    ///
    /// Subscribers that hung up since the last commit are dropped first.
    pub fn subscribe(&self, session_id: SessionId) -> mpsc::Receiver<DraftEvent> {
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let senders = subscribers.entry(session_id).or_default();
        senders.retain(|sender| !sender.is_closed());
        senders.push(tx);
        drop(subscribers);
        log::debug!("New subscriber for session {}", session_id);
        rx
    }

    /// Live subscribers for a session
    pub fn subscriber_count(&self, session_id: SessionId) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session_id)
            .map_or(0, |senders| senders.iter().filter(|s| !s.is_closed()).count())
    }
}

impl DraftBroadcaster for SubscriberHub {
    fn action_committed(&self, event: &DraftEvent) {
        let session_id = event.session.id();
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(senders) = subscribers.get_mut(&session_id) else {
            return;
        };

        senders.retain(|sender| match sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!(
                    "Subscriber channel for session {} full, dropping action {}",
                    session_id,
                    event.action.order
                );
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Subscriber for session {} disconnected, removing", session_id);
                false
            }
        });

        if senders.is_empty() {
            subscribers.remove(&session_id);
        }
    }
}
