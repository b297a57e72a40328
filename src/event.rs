//! Host event system.

use tokio::sync::broadcast;

/// Events emitted by the verifier host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A backend was brought online at start-up.
    BackendLoaded {
        /// Backend type name.
        backend: String,
    },

    /// A reload replaced the running backend.
    BackendReloaded {
        /// Type name of the new backend.
        backend: String,
    },

    /// A reload failed; the previous backend keeps serving.
    ReloadFailed {
        /// Why the new backend could not be constructed.
        reason: String,
    },

    /// A verification produced no answer.
    VerificationFailed {
        /// `host:port` of the request.
        target: String,
        /// Error message.
        reason: String,
    },

    /// A verification hit the host timeout.
    VerificationTimedOut {
        /// `host:port` of the request.
        target: String,
    },
}

/// Channel for receiving host events.
pub type HostEventsChannel = broadcast::Receiver<HostEvent>;

/// Sender for host events.
pub type HostEventsSender = broadcast::Sender<HostEvent>;

/// Create a new event channel pair.
#[must_use]
pub fn create_event_channel() -> (HostEventsSender, HostEventsChannel) {
    broadcast::channel(256)
}
