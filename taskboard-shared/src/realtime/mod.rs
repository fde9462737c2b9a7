/// Real-time synchronization core
///
/// This module holds the registry of authenticated live connections and
/// the dispatcher that fans domain events out to them.
///
/// # Modules
///
/// - `registry`: authenticated identity → live socket handle mapping
/// - `broadcast`: serialize-once, fire-and-forget event fan-out
/// - `heartbeat`: periodic liveness probe over all admitted connections
///
/// # Delivery Contract
///
/// Delivery is best-effort: no retry, no queue, no persistence. An
/// event not received by a disconnected client is permanently lost to
/// that client. Within one dispatcher instance, events reach each live
/// recipient in publish order.
///
/// # Example
///
/// ```
/// use taskboard_shared::realtime::registry::{ClientHandle, ConnectionRegistry};
/// use taskboard_shared::realtime::broadcast::EventBroadcaster;
/// use taskboard_shared::events::BoardEvent;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let registry = ConnectionRegistry::new();
/// let broadcaster = EventBroadcaster::new(registry.clone());
///
/// let (handle, mut rx) = ClientHandle::new();
/// registry.admit(42, handle).await;
///
/// broadcaster.publish(&BoardEvent::TaskDeleted { id: 7 }).await;
/// # let _ = rx.recv().await;
/// # }
/// ```

pub mod broadcast;
pub mod heartbeat;
pub mod registry;
