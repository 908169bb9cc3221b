use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use crate::gateway::ConfigGateway;
use crate::store::OrderedRecords;
use crate::types::{Listener, ListenerStats, ListenerStatus};

////////////////////////////////////////////////////////////
// Statistics snapshot
////////////////////////////////////////////////////////////

/// Latest known runtime picture of the service: per-listener traffic
/// counters, failed listeners with their reasons, and the listener
/// definitions for display. Each slice is overwritten independently by
/// whichever read completes; there is no cross-slice consistency
/// guarantee and none is needed for display.
#[derive(Debug, Default)]
pub struct StatsSnapshot {
    pub stats: Vec<ListenerStats>,
    pub failed: Vec<(String, String)>,
    pub listeners: OrderedRecords<Listener>,
    pub cycles: u64,
    pub updated: Option<SystemTime>,
}

impl StatsSnapshot {
    pub fn set_stats(&mut self, map: HashMap<String, ListenerStats>) {
        let mut stats: Vec<ListenerStats> = map.into_values().collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        self.stats = stats;
        self.updated = Some(SystemTime::now());
    }

    /// Keep only the `Err` entries, as (name, reason) pairs.
    pub fn set_failed(&mut self, statuses: HashMap<String, ListenerStatus>) {
        let mut failed: Vec<(String, String)> = statuses
            .into_iter()
            .filter_map(|(name, status)| match status {
                ListenerStatus::Ok(_) => None,
                ListenerStatus::Err { message } => Some((name, message)),
            })
            .collect();
        failed.sort();
        self.failed = failed;
    }

    pub fn set_listeners(&mut self, map: HashMap<String, Listener>) {
        self.listeners.replace_all(map);
    }

    pub fn bind_of(&self, name: &str) -> Option<&str> {
        self.listeners.get(name).map(|l| l.bind.as_str())
    }
}

////////////////////////////////////////////////////////////
// Periodic refresher
////////////////////////////////////////////////////////////

/// Self-rescheduling poller: every tick fires three independent reads
/// concurrently and overwrites the snapshot with whatever comes back.
/// The ticker does not wait for a cycle to finish, so overlapping
/// cycles are possible; later completions simply win.
pub struct StatsRefresher<G> {
    gateway: Arc<G>,
    snapshot: Arc<Mutex<StatsSnapshot>>,
    interval: Duration,
}

impl<G> StatsRefresher<G>
where
    G: ConfigGateway + Send + Sync + 'static,
{
    pub fn new(gateway: Arc<G>, interval: Duration) -> Self {
        Self {
            gateway,
            snapshot: Arc::new(Mutex::new(StatsSnapshot::default())),
            interval,
        }
    }

    pub fn snapshot(&self) -> Arc<Mutex<StatsSnapshot>> {
        self.snapshot.clone()
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                let gateway = self.gateway.clone();
                let snapshot = self.snapshot.clone();
                tokio::spawn(async move {
                    Self::cycle(gateway, snapshot).await;
                });
            }
        })
    }

    /// One refresh cycle. Each read failure is logged and skipped; the
    /// corresponding slice keeps its previous contents.
    pub async fn cycle(gateway: Arc<G>, snapshot: Arc<Mutex<StatsSnapshot>>) {
        let (stats, statuses, listeners) = tokio::join!(
            gateway.listener_stats(),
            gateway.listener_statuses(),
            gateway.fetch_listeners(),
        );

        let mut snap = snapshot.lock().unwrap();
        snap.cycles += 1;

        match stats {
            Ok(map) => snap.set_stats(map),
            Err(e) => log::warn!("stats fetch failed: {}", e),
        }
        match statuses {
            Ok(map) => snap.set_failed(map),
            Err(e) => log::warn!("status fetch failed: {}", e),
        }
        match listeners {
            Ok(map) => snap.set_listeners(map),
            Err(e) => log::warn!("listener fetch failed: {}", e),
        }
    }
}
