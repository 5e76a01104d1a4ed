// In-process realtime store, for offline runs and tests
use crate::application::realtime_store::{RealtimeStore, StoreError, StoreEvent};
use crate::application::store_key::{normalize_path, paths_overlap, split_path};
use crate::application::subscription::Subscription;
use crate::infrastructure::json_tree;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

const CHANGE_BUFFER: usize = 256;

#[derive(Debug, Clone)]
pub struct MemoryStore {
    tree: Arc<RwLock<Value>>,
    changes: broadcast::Sender<String>,
    lifecycle: CancellationToken,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_value(Value::Null)
    }

    pub fn with_value(root: Value) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            tree: Arc::new(RwLock::new(root)),
            changes,
            lifecycle: CancellationToken::new(),
        }
    }

    /// Write `value` at `path` and notify overlapping subscriptions.
    /// Null deletes.
    pub fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        if self.lifecycle.is_cancelled() {
            return Err(StoreError::Closed);
        }
        let path = normalize_path(path)?;
        {
            let mut tree = self.tree.write().unwrap_or_else(|e| e.into_inner());
            json_tree::put(&mut tree, &split_path(&path), value);
        }
        // No receivers is fine
        let _ = self.changes.send(path);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        let path = normalize_path(path).ok()?;
        read_value(&self.tree, &path)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read_value(tree: &RwLock<Value>, path: &str) -> Option<Value> {
    let tree = tree.read().unwrap_or_else(|e| e.into_inner());
    json_tree::get(&tree, &split_path(path)).cloned()
}

fn read_event(tree: &RwLock<Value>, path: &str) -> StoreEvent {
    match read_value(tree, path) {
        Some(value) => StoreEvent::Value(value),
        None => StoreEvent::NoData,
    }
}

#[async_trait]
impl RealtimeStore for MemoryStore {
    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        if self.lifecycle.is_cancelled() {
            return Err(StoreError::Closed);
        }
        let path = normalize_path(path)?;
        let (feed, subscription) = Subscription::channel(&path, &self.lifecycle);

        // Subscribe to changes before reading the initial value so no write
        // slips in between.
        let mut changes = self.changes.subscribe();
        let tree = self.tree.clone();

        tokio::spawn(async move {
            if !feed.send(read_event(&tree, &path)).await {
                return;
            }
            loop {
                let changed = tokio::select! {
                    _ = feed.cancelled() => break,
                    changed = changes.recv() => changed,
                };
                match changed {
                    Ok(written) if !paths_overlap(&written, &path) => continue,
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
                if !feed.send(read_event(&tree, &path)).await {
                    break;
                }
            }
            tracing::debug!(path = %path, "Memory subscription finished");
        });

        Ok(subscription)
    }

    fn publish(&self, path: &str, record: Value) -> Result<(), StoreError> {
        self.set(path, record)
    }

    async fn close(&self) {
        self.lifecycle.cancel();
    }
}
