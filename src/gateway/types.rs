use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Listener, ListenerStats, ListenerStatus, OperationOutcome, SimpleResult};

/// Boundary to the server that owns the authoritative configuration
/// and runtime state. Every write is idempotent from this side: a
/// retried save with the same body is safe.
#[async_trait]
pub trait ConfigGateway {
    async fn fetch_dns(&self) -> Result<HashMap<String, String>>;

    async fn save_dns(&self, map: &HashMap<String, String>) -> Result<HashMap<String, String>>;

    async fn fetch_listeners(&self) -> Result<HashMap<String, Listener>>;

    async fn save_listeners(
        &self,
        map: &HashMap<String, Listener>,
    ) -> Result<HashMap<String, Listener>>;

    async fn listener_statuses(&self) -> Result<HashMap<String, ListenerStatus>>;

    async fn listener_stats(&self) -> Result<HashMap<String, ListenerStats>>;

    /// Start the service. The answer is either a service-level result
    /// ("already running") or a per-listener map, so it comes back
    /// pre-discriminated.
    async fn start(&self) -> Result<OperationOutcome>;

    async fn stop(&self) -> Result<SimpleResult>;

    /// Apply the saved configuration, restarting every listener.
    async fn restart(&self) -> Result<OperationOutcome>;

    /// Roll the saved configuration back to the last applied one.
    async fn restore(&self) -> Result<String>;
}
