// Store that feeds generated telemetry on a timer at the telemetry path
use crate::application::mock_generator::MockTelemetryGenerator;
use crate::application::realtime_store::{RealtimeStore, StoreError, StoreEvent};
use crate::application::store_key::normalize_path;
use crate::application::subscription::Subscription;
use crate::infrastructure::memory_store::MemoryStore;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Subscriptions on the telemetry path get a fresh generated record every
/// `interval`; every other path is served by an in-memory store.
#[derive(Debug, Clone)]
pub struct MockStore {
    telemetry_path: String,
    interval: Duration,
    seed: Option<u64>,
    inner: MemoryStore,
    lifecycle: CancellationToken,
}

impl MockStore {
    pub fn new(telemetry_path: &str, interval: Duration) -> Result<Self, StoreError> {
        Ok(Self {
            telemetry_path: normalize_path(telemetry_path)?,
            // tokio intervals reject a zero period
            interval: interval.max(Duration::from_millis(1)),
            seed: None,
            inner: MemoryStore::new(),
            lifecycle: CancellationToken::new(),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[async_trait]
impl RealtimeStore for MockStore {
    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        if self.lifecycle.is_cancelled() {
            return Err(StoreError::Closed);
        }
        let path = normalize_path(path)?;
        if path != self.telemetry_path {
            return self.inner.subscribe(&path).await;
        }

        let (feed, subscription) = Subscription::channel(&path, &self.lifecycle);
        let mut generator = match self.seed {
            Some(seed) => MockTelemetryGenerator::with_seed(seed),
            None => MockTelemetryGenerator::new(),
        };
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = feed.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if !feed.send(StoreEvent::Value(generator.next_record())).await {
                    break;
                }
            }
            tracing::debug!("Mock telemetry timer stopped");
        });

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Mock telemetry feed started");
        Ok(subscription)
    }

    fn publish(&self, path: &str, record: Value) -> Result<(), StoreError> {
        if self.lifecycle.is_cancelled() {
            return Err(StoreError::Closed);
        }
        self.inner.publish(path, record)
    }

    async fn close(&self) {
        self.lifecycle.cancel();
        self.inner.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_emit_records() {
        let store = MockStore::new("", Duration::from_millis(1500)).unwrap().with_seed(1);
        let mut sub = store.subscribe("/").await.unwrap();

        for _ in 0..3 {
            match sub.next().await {
                Some(StoreEvent::Value(record)) => assert!(record["Speedometer"].is_f64()),
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_timer() {
        let store = MockStore::new("bike", Duration::from_millis(1500)).unwrap();
        let mut sub = store.subscribe("bike").await.unwrap();
        assert!(sub.next().await.is_some());

        assert!(sub.cancel());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn test_other_paths_use_memory() {
        let store = MockStore::new("bike", Duration::from_millis(1500)).unwrap();
        store.publish("users/x", json!({"username": "ana"})).unwrap();

        let mut sub = store.subscribe("users/x").await.unwrap();
        assert_eq!(sub.next().await, Some(StoreEvent::Value(json!({"username": "ana"}))));
    }

    #[tokio::test]
    async fn test_close_rejects_new_subscriptions() {
        let store = MockStore::new("bike", Duration::from_millis(1500)).unwrap();
        store.close().await;
        assert!(matches!(store.subscribe("bike").await, Err(StoreError::Closed)));
    }
}
