use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::types::{Listener, ListenerStats, ListenerStatus, OperationOutcome, SimpleResult};
use crate::wrapper::http;

use super::ConfigGateway;

/// JSON client for the forwarding service's admin endpoint.
pub struct HttpGateway {
    cli: http::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        let mut cli = http::Client::new();
        cli.set_default_headers(vec![
            http::Header::basic_auth(username, password),
            http::Header::new(
                http::HeaderKey::ContentType,
                "application/json".to_string(),
            ),
        ]);

        Self {
            cli,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/apiserver{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.cli.get(&self.url(path)).await?.into_body()?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let payload = serde_json::to_string(body)?;
        let body = self.cli.put(&self.url(path), payload).await?.into_body()?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_outcome(&self, path: &str) -> Result<OperationOutcome> {
        let json = self
            .cli
            .post(&self.url(path), String::new())
            .await?
            .into_json()?;
        OperationOutcome::from_value(json)
    }
}

#[async_trait]
impl ConfigGateway for HttpGateway {
    async fn fetch_dns(&self) -> Result<HashMap<String, String>> {
        log::debug!("fetching dns overrides");
        self.get_json("/config/dns").await
    }

    async fn save_dns(&self, map: &HashMap<String, String>) -> Result<HashMap<String, String>> {
        log::info!("saving {} dns overrides", map.len());
        self.put_json("/config/dns", map).await
    }

    async fn fetch_listeners(&self) -> Result<HashMap<String, Listener>> {
        log::debug!("fetching listeners");
        self.get_json("/config/listeners").await
    }

    async fn save_listeners(
        &self,
        map: &HashMap<String, Listener>,
    ) -> Result<HashMap<String, Listener>> {
        log::info!("saving {} listeners", map.len());
        self.put_json("/config/listeners", map).await
    }

    async fn listener_statuses(&self) -> Result<HashMap<String, ListenerStatus>> {
        self.get_json("/status/listeners").await
    }

    async fn listener_stats(&self) -> Result<HashMap<String, ListenerStats>> {
        self.get_json("/stats/listeners").await
    }

    async fn start(&self) -> Result<OperationOutcome> {
        log::info!("starting service");
        self.post_outcome("/config/start").await
    }

    async fn stop(&self) -> Result<SimpleResult> {
        log::info!("stopping service");
        let body = self
            .cli
            .post(&self.url("/config/stop"), String::new())
            .await?
            .into_body()?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn restart(&self) -> Result<OperationOutcome> {
        log::info!("applying saved configuration");
        self.post_outcome("/config/apply").await
    }

    async fn restore(&self) -> Result<String> {
        log::info!("restoring last applied configuration");
        let body = self
            .cli
            .post(&self.url("/config/reset"), String::new())
            .await?
            .into_body()?;
        Ok(serde_json::from_str(&body)?)
    }
}
