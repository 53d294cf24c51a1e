//! Per-IP reconnect cooldown, translating the source's `disconnect_times`
//! dict and `cleanup_disconnects` thread loop into a `DashMap` plus a
//! periodic sweeper task.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::debug;

/// Tracks the most recent disconnect timestamp per source IP so the accept
/// loop can refuse an immediate reconnect.
#[derive(Debug, Default)]
pub struct DisconnectTracker {
    last_disconnect: DashMap<IpAddr, Instant>,
}

impl DisconnectTracker {
    pub fn new() -> Self {
        DisconnectTracker::default()
    }

    pub fn record(&self, ip: IpAddr) {
        self.last_disconnect.insert(ip, Instant::now());
    }

    /// Returns `true` if `ip` disconnected within `cooldown` and a new
    /// connection from it should be refused.
    pub fn is_on_cooldown(&self, ip: IpAddr, cooldown: Duration) -> bool {
        self.last_disconnect
            .get(&ip)
            .is_some_and(|last| last.elapsed() < cooldown)
    }

    /// Drops entries older than `retention`. Run periodically by
    /// [`spawn_sweeper`] so the map doesn't grow without bound.
    pub fn sweep(&self, retention: Duration) {
        let before = self.last_disconnect.len();
        self.last_disconnect
            .retain(|_, last| last.elapsed() <= retention);
        let removed = before - self.last_disconnect.len();
        if removed > 0 {
            debug!("disconnect tracker sweep evicted {removed} stale entries");
        }
    }
}

/// Spawns the background sweeper task. Exits when `tracker` has no more
/// external references.
pub fn spawn_sweeper(
    tracker: std::sync::Arc<DisconnectTracker>,
    interval: Duration,
    retention: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if std::sync::Arc::strong_count(&tracker) == 1 {
                break;
            }
            tracker.sweep(retention);
        }
    })
}
