/// Broadcast dispatcher
///
/// Serializes a domain event exactly once and pushes the same payload
/// to every entry in the connection registry's live-handles snapshot.
///
/// Delivery is fire-and-forget per recipient: a failure to deliver to
/// one recipient never prevents delivery to the others and is never
/// surfaced to the publisher. There is no retry, no queue, and no
/// persistence.

use crate::events::BoardEvent;
use crate::realtime::registry::ConnectionRegistry;
use tracing::{debug, warn};

/// Dispatcher that fans domain events out to live connections
///
/// Cheap to clone; clones share the same registry.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    registry: ConnectionRegistry,
}

impl EventBroadcaster {
    /// Creates a broadcaster over the given registry
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// The registry this broadcaster fans out over
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Publishes an event to every live connection
    ///
    /// Never fails from the caller's perspective: serialization problems
    /// and per-recipient delivery failures are logged and swallowed, so
    /// the task mutation that triggered the publish always completes.
    pub async fn publish(&self, event: &BoardEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                // Should be unreachable for our event types
                warn!(error = %e, "Failed to serialize broadcast event");
                return;
            }
        };

        let handles = self.registry.live_handles().await;
        let mut delivered = 0usize;

        for (user_id, handle) in &handles {
            if !handle.is_open() {
                continue;
            }
            if handle.send_event(payload.clone()) {
                delivered += 1;
            } else {
                debug!(user_id, "Skipped closed connection during broadcast");
            }
        }

        debug!(
            event_type = event.event_type(),
            recipients = handles.len(),
            delivered,
            "Broadcast dispatched"
        );
    }
}
