//! Typed cross-component signals.
//!
//! The history sidebar stays current without polling: the synchronizer
//! publishes a signal whenever a session changes, and interested components
//! subscribe. This is a typed broadcast channel, deliberately not a
//! string-keyed global event.

use tokio::sync::broadcast;

use crate::conversation::lead::LeadField;

/// Events published by the session synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// A session record was created remotely.
    Created { session_id: String },
    /// One collected field was persisted.
    Updated {
        session_id: String,
        field: LeadField,
    },
    /// A session was deleted.
    Deleted { session_id: String },
    /// A best-effort update exhausted its retries; local state is ahead of
    /// the server. Non-fatal.
    SyncLagged { session_id: String },
    /// A transient, user-visible notice (e.g. a stale session reference was
    /// transparently replaced).
    Notice { message: String },
}

/// Broadcast bus for [`SessionSignal`]s.
///
/// Publishing never blocks and never fails: with no subscribers the signal
/// is simply dropped.
#[derive(Debug, Clone)]
pub struct SignalBus {
    sender: broadcast::Sender<SessionSignal>,
}

impl SignalBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to all signals published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.sender.subscribe()
    }

    /// Publishes a signal to every current subscriber.
    pub fn publish(&self, signal: SessionSignal) {
        // Err just means nobody is listening right now
        let _ = self.sender.send(signal);
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(64)
    }
}
