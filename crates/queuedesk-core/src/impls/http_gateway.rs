//! HttpQueueGateway - リモートのキューイングエンジン（HTTP）
//!
//! - `POST {base}/enqueue/{id}?sname={short_code}` → `{"ticket": "..."}`
//! - `POST {base}/dequeue/{id}` → `{"ticket": "..."}`
//!
//! 200 以外はすべて Status、デコードできないボディは Malformed、接続失敗は Transport。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::config::QueueEngineConfig;
use crate::domain::Ticket;
use crate::ports::{GatewayError, QueueGateway};

pub struct HttpQueueGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpQueueGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self::with_client(base_url, client))
    }

    /// Use a preconfigured client (proxy, TLS, pooling settings).
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn from_config(config: &QueueEngineConfig) -> Result<Self, GatewayError> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    fn enqueue_url(&self, id: &str, short_code: &str) -> Result<Url, GatewayError> {
        let mut url = self.url(&format!("enqueue/{id}"))?;
        url.query_pairs_mut().append_pair("sname", short_code);
        Ok(url)
    }

    fn dequeue_url(&self, id: &str) -> Result<Url, GatewayError> {
        self.url(&format!("dequeue/{id}"))
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        Url::parse(&format!("{}/{path}", self.base_url))
            .map_err(|e| GatewayError::Transport(format!("failed to create request: {e}")))
    }

    async fn post_for_ticket(&self, url: Url) -> Result<Ticket, GatewayError> {
        debug!(%url, "calling queue engine");
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to send request: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to read response: {e}")))?;
        serde_json::from_slice(&body)
            .map_err(|e| GatewayError::Malformed(format!("failed to parse response: {e}")))
    }
}

#[async_trait]
impl QueueGateway for HttpQueueGateway {
    async fn issue(&self, id: &str, short_code: &str) -> Result<Ticket, GatewayError> {
        let url = self.enqueue_url(id, short_code)?;
        self.post_for_ticket(url).await
    }

    async fn retire(&self, id: &str) -> Result<Ticket, GatewayError> {
        let url = self.dequeue_url(id)?;
        self.post_for_ticket(url).await
    }
}
