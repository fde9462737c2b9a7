/// Connection heartbeat
///
/// On a fixed 30-second period, every currently admitted connection is
/// sent a transport-level ping. The registry does not count missed
/// probes: a socket that stopped answering surfaces as closed or
/// erroring through the transport, and its socket task removes the
/// entry. The sweep itself only evicts entries whose command channel is
/// already gone.
///
/// The heartbeat is the process's only recurring task. It has no
/// cancellation path beyond process shutdown.

use crate::realtime::registry::ConnectionRegistry;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Probe period
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawns the heartbeat task over the given registry
///
/// The task runs for the lifetime of the process; the returned handle
/// is not normally awaited.
pub fn spawn_heartbeat(registry: ConnectionRegistry) -> JoinHandle<()> {
    spawn_heartbeat_with_interval(registry, HEARTBEAT_INTERVAL)
}

/// Spawns the heartbeat with an explicit period (testable variant)
pub fn spawn_heartbeat_with_interval(
    registry: ConnectionRegistry,
    period: Duration,
) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "Starting connection heartbeat");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // First tick fires immediately; skip straight to the cadence.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sweep(&registry).await;
        }
    })
}

/// Pings every live handle once, evicting those already gone
async fn sweep(registry: &ConnectionRegistry) {
    let handles = registry.live_handles().await;
    let mut pinged = 0usize;

    for (user_id, handle) in handles {
        if handle.ping() {
            pinged += 1;
        } else {
            // Channel closed: the socket task is gone, drop the entry.
            registry.remove(user_id, handle.connection_id()).await;
        }
    }

    debug!(pinged, "Heartbeat sweep completed");
}
