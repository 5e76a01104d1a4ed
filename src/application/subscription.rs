// Cancellable subscription handle shared by all store implementations
use crate::application::realtime_store::StoreEvent;
use futures::stream::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const SUBSCRIPTION_BUFFER: usize = 32;

/// Consumer side of a live subscription. Dropping it cancels the producer.
#[derive(Debug)]
pub struct Subscription {
    path: String,
    events: mpsc::Receiver<StoreEvent>,
    cancel: CancellationToken,
}

/// Producer side, owned by the task that talks to the store
#[derive(Debug, Clone)]
pub struct SubscriptionFeed {
    tx: mpsc::Sender<StoreEvent>,
    cancel: CancellationToken,
}

impl Subscription {
    /// Create a linked feed/subscription pair. Cancelling `parent` (the
    /// owning client's lifetime) cancels the subscription too.
    pub fn channel(path: &str, parent: &CancellationToken) -> (SubscriptionFeed, Subscription) {
        let (tx, events) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let cancel = parent.child_token();
        let feed = SubscriptionFeed {
            tx,
            cancel: cancel.clone(),
        };
        let subscription = Subscription {
            path: path.to_string(),
            events,
            cancel,
        };
        (feed, subscription)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Next event, or `None` once the subscription is cancelled or the
    /// producer has gone away
    pub async fn next(&mut self) -> Option<StoreEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            event = self.events.recv() => event,
        }
    }

    /// Tear the subscription down. Returns true only for the call that
    /// actually cancelled it; later calls are no-ops.
    pub fn cancel(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.cancel.cancel();
        tracing::debug!(path = %self.path, "Subscription cancelled");
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn into_stream(mut self) -> impl Stream<Item = StoreEvent> + Send + 'static {
        async_stream::stream! {
            while let Some(event) = self.next().await {
                yield event;
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl SubscriptionFeed {
    /// Deliver an event. Returns false once the consumer is gone, at which
    /// point the producer should stop.
    pub async fn send(&self, event: StoreEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(event) => sent.is_ok(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }

    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}
