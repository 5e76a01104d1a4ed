// Store trait for realtime key-value access
use crate::application::subscription::Subscription;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store client is closed")]
    Closed,
    #[error("invalid store path: {0}")]
    InvalidPath(String),
}

/// One notification on a live subscription
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Full value currently stored at the subscribed path
    Value(Value),
    /// The path holds nothing
    NoData,
    /// The connection dropped; more events may follow after a reconnect
    Disconnected(String),
}

/// Path-addressed hierarchical store with live subscriptions.
///
/// Clients are constructed explicitly and shared as `Arc<dyn RealtimeStore>`.
/// After `close` every live subscription ends and further calls fail with
/// `StoreError::Closed`.
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Open a live subscription on `path`. The current value (or `NoData`)
    /// is delivered first, then one event per remote change.
    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError>;

    /// Fire-and-forget write of `record` at `path`. Returns before the write
    /// lands; failures are logged, never retried.
    fn publish(&self, path: &str, record: Value) -> Result<(), StoreError>;

    /// Idempotent
    async fn close(&self);
}
