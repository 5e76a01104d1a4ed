// Profile service - Demo write path that round-trips a user record
use crate::application::realtime_store::{RealtimeStore, StoreError, StoreEvent};
use crate::application::store_key::sanitize_key;
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn RealtimeStore>,
}

/// Store path of a user's record, keyed by sanitized email
pub fn profile_path(email: &str) -> String {
    format!("users/{}", sanitize_key(email))
}

impl ProfileService {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Push the profile upstream without waiting for it to land. An empty
    /// email has no key to write under and is skipped (returns false).
    pub fn save(&self, username: &str, email: &str) -> Result<bool, StoreError> {
        if email.is_empty() {
            return Ok(false);
        }
        let record = json!({ "username": username, "email": email });
        self.store.publish(&profile_path(email), record)?;
        Ok(true)
    }

    /// Live view of the stored profile; `None` while nothing is stored
    pub async fn watch(&self, email: &str) -> Result<BoxStream<'static, Option<UserProfile>>, StoreError> {
        let subscription = self.store.subscribe(&profile_path(email)).await?;
        let stream = subscription.into_stream().filter_map(|event| async move {
            match event {
                StoreEvent::Value(value) => Some(serde_json::from_value(value).ok()),
                StoreEvent::NoData => Some(None),
                StoreEvent::Disconnected(_) => None,
            }
        });
        Ok(stream.boxed())
    }
}
