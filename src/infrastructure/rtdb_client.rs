// Realtime Database client - REST streaming for reads, PUT for writes
use crate::application::realtime_store::{RealtimeStore, StoreError, StoreEvent};
use crate::application::store_key::{normalize_path, split_path};
use crate::application::subscription::{Subscription, SubscriptionFeed};
use crate::infrastructure::config::StoreSettings;
use crate::infrastructure::json_tree;
use crate::infrastructure::sse::{SseEvent, SseParser};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct RtdbClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    reconnect_delay: Duration,
    lifecycle: CancellationToken,
}

/// Payload of `put` and `patch` stream events
#[derive(Debug, Deserialize)]
struct StreamPayload {
    path: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, PartialEq)]
enum StreamAction {
    Emit,
    Ignore,
    Close(String),
}

impl RtdbClient {
    pub fn open(settings: &StoreSettings) -> Result<Self> {
        let base_url = settings.database_url.trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url)
            .with_context(|| format!("Invalid database URL '{}'", base_url))?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            anyhow::bail!("Unsupported database URL scheme '{}'", parsed.scheme());
        }

        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        tracing::info!("Realtime store client opened for {}", base_url);

        Ok(Self {
            http,
            base_url,
            auth_token: settings.auth_token.clone().filter(|t| !t.is_empty()),
            reconnect_delay: Duration::from_millis(settings.reconnect_delay_ms),
            lifecycle: CancellationToken::new(),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle.is_cancelled()
    }

    /// REST URL for a normalized path
    fn url_for(&self, path: &str) -> String {
        let encoded: Vec<String> = split_path(path)
            .into_iter()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        let mut url = format!("{}/{}.json", self.base_url, encoded.join("/"));
        if let Some(token) = &self.auth_token {
            url.push_str("?auth=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }
}

#[async_trait]
impl RealtimeStore for RtdbClient {
    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        let path = normalize_path(path)?;
        let (feed, subscription) = Subscription::channel(&path, &self.lifecycle);

        let http = self.http.clone();
        let url = self.url_for(&path);
        let reconnect_delay = self.reconnect_delay;
        tokio::spawn(async move {
            run_stream(http, url, reconnect_delay, feed).await;
            tracing::debug!(path = %path, "Realtime subscription finished");
        });

        Ok(subscription)
    }

    fn publish(&self, path: &str, record: Value) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        let path = normalize_path(path)?;
        let url = self.url_for(&path);
        let http = self.http.clone();

        tokio::spawn(async move {
            match http.put(&url).json(&record).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(path = %path, "Published record");
                }
                Ok(response) => {
                    tracing::warn!(path = %path, "Publish rejected with status {}", response.status());
                }
                Err(e) => {
                    tracing::warn!(path = %path, "Publish failed: {}", e);
                }
            }
        });
        Ok(())
    }

    async fn close(&self) {
        if !self.lifecycle.is_cancelled() {
            self.lifecycle.cancel();
            tracing::info!("Realtime store client closed");
        }
    }
}

/// Keep one subscription alive until it is cancelled, reconnecting after
/// every disconnect.
async fn run_stream(
    http: reqwest::Client,
    url: String,
    reconnect_delay: Duration,
    feed: SubscriptionFeed,
) {
    loop {
        let result = tokio::select! {
            _ = feed.cancelled() => return,
            result = read_stream(&http, &url, &feed) => result,
        };

        if feed.is_cancelled() {
            return;
        }
        let reason = match result {
            Ok(()) => "stream ended".to_string(),
            Err(e) => format!("{:#}", e),
        };
        tracing::warn!("Realtime stream disconnected: {}", reason);
        if !feed.send(StoreEvent::Disconnected(reason)).await {
            return;
        }

        tokio::select! {
            _ = feed.cancelled() => return,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }
}

async fn read_stream(http: &reqwest::Client, url: &str, feed: &SubscriptionFeed) -> Result<()> {
    let response = http
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await
        .context("Failed to open realtime stream")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Realtime stream rejected with status {}: {}", status, body);
    }

    // Fresh mirror per connection; the server starts every stream with a
    // full put of the subscribed location.
    let mut tree = Value::Null;
    let mut parser = SseParser::default();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Realtime stream read failed")?;
        for event in parser.feed(&chunk) {
            match apply_stream_event(&mut tree, &event) {
                StreamAction::Emit => {
                    let next = match json_tree::get(&tree, &[]) {
                        Some(value) => StoreEvent::Value(value.clone()),
                        None => StoreEvent::NoData,
                    };
                    if !feed.send(next).await {
                        return Ok(());
                    }
                }
                StreamAction::Ignore => {}
                StreamAction::Close(reason) => anyhow::bail!(reason),
            }
        }
    }

    Ok(())
}

fn apply_stream_event(tree: &mut Value, event: &SseEvent) -> StreamAction {
    match event.event.as_str() {
        "put" | "patch" => {
            let payload: StreamPayload = match serde_json::from_str(&event.data) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Malformed {} event ignored: {}", event.event, e);
                    return StreamAction::Ignore;
                }
            };
            let segments = split_path(&payload.path);
            if event.event == "put" {
                json_tree::put(tree, &segments, payload.data);
            } else if !json_tree::patch(tree, &segments, &payload.data) {
                tracing::warn!("Patch without object data ignored at '{}'", payload.path);
                return StreamAction::Ignore;
            }
            StreamAction::Emit
        }
        "keep-alive" => StreamAction::Ignore,
        "cancel" => StreamAction::Close("subscription cancelled by server".to_string()),
        "auth_revoked" => StreamAction::Close("auth token revoked".to_string()),
        other => {
            tracing::debug!("Unknown stream event '{}' ignored", other);
            StreamAction::Ignore
        }
    }
}
