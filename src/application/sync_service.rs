// Telemetry sync service - Mirrors the remote record into dashboard state
use crate::application::realtime_store::{RealtimeStore, StoreEvent};
use crate::domain::alert::{AlertBoard, AlertKind};
use crate::domain::dashboard::{DashboardView, LinkStatus};
use crate::domain::history::TelemetryHistory;
use crate::domain::telemetry::TelemetrySnapshot;
use crate::infrastructure::wire_record::normalize;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Everything the dashboard shows, owned by the sync loop
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub snapshot: Option<TelemetrySnapshot>,
    pub link: LinkStatus,
    pub history: TelemetryHistory,
    pub alerts: AlertBoard,
    pub updates: u64,
}

impl DashboardState {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            snapshot: None,
            link: LinkStatus::Connecting,
            history: TelemetryHistory::new(history_capacity),
            alerts: AlertBoard::default(),
            updates: 0,
        }
    }

    /// Apply one store notification. Returns the alerts it opened.
    pub fn apply(&mut self, event: StoreEvent, received_at: DateTime<Utc>) -> Vec<AlertKind> {
        match event {
            StoreEvent::Value(raw) if raw.is_object() => {
                let snapshot = normalize(&raw, received_at);
                self.history.record(&snapshot);
                let opened = self.alerts.observe(&snapshot);
                self.snapshot = Some(snapshot);
                self.link = LinkStatus::Live;
                self.updates += 1;
                opened
            }
            StoreEvent::Value(raw) if !raw.is_null() => {
                tracing::warn!("Telemetry value is not a record, treating as no data: {}", raw);
                self.link = LinkStatus::NoData;
                Vec::new()
            }
            StoreEvent::Value(_) | StoreEvent::NoData => {
                self.link = LinkStatus::NoData;
                Vec::new()
            }
            StoreEvent::Disconnected(_) => {
                self.mark_disconnected();
                Vec::new()
            }
        }
    }

    /// Keep the last snapshot on screen but flag it as stale
    pub fn mark_disconnected(&mut self) {
        if self.snapshot.is_some() {
            self.link = LinkStatus::Stale;
        }
    }

    pub fn view(&self) -> DashboardView {
        DashboardView::build(self.snapshot.as_ref(), self.link, &self.history, &self.alerts)
    }
}

pub struct TelemetrySyncService {
    store: Arc<dyn RealtimeStore>,
    path: String,
    state_tx: watch::Sender<DashboardState>,
}

impl TelemetrySyncService {
    pub fn new(store: Arc<dyn RealtimeStore>, path: &str, history_capacity: usize) -> Self {
        let (state_tx, _) = watch::channel(DashboardState::new(history_capacity));
        Self {
            store,
            path: path.to_string(),
            state_tx,
        }
    }

    pub fn watch(&self) -> watch::Receiver<DashboardState> {
        self.state_tx.subscribe()
    }

    pub fn current(&self) -> DashboardState {
        self.state_tx.borrow().clone()
    }

    pub fn dismiss_alert(&self, kind: AlertKind) -> bool {
        let mut dismissed = false;
        self.state_tx.send_if_modified(|state| {
            dismissed = state.alerts.dismiss(kind);
            dismissed
        });
        if dismissed {
            tracing::info!(alert = %kind, "Alert dismissed");
        }
        dismissed
    }

    pub fn apply(&self, event: StoreEvent) {
        let received_at = Utc::now();
        let mut opened = Vec::new();
        self.state_tx.send_modify(|state| opened = state.apply(event, received_at));
        for kind in opened {
            tracing::warn!(alert = %kind, "Alert raised");
        }
    }

    /// Follow the telemetry path until `shutdown` fires or the store ends
    /// the subscription. The subscription is torn down exactly once on exit.
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let mut subscription = self
            .store
            .subscribe(&self.path)
            .await
            .with_context(|| format!("Failed to subscribe to telemetry at '{}'", self.path))?;
        tracing::info!(path = %subscription.path(), "Telemetry subscription opened");

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = subscription.next() => event,
            };
            match event {
                Some(StoreEvent::Disconnected(reason)) => {
                    tracing::warn!("Telemetry link lost, keeping last snapshot: {}", reason);
                    self.apply(StoreEvent::Disconnected(reason));
                }
                Some(event) => self.apply(event),
                None => {
                    tracing::warn!("Telemetry subscription ended by the store");
                    self.state_tx.send_modify(DashboardState::mark_disconnected);
                    break;
                }
            }
        }

        subscription.cancel();
        tracing::info!("Telemetry sync stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::AlertState;
    use crate::infrastructure::memory_store::MemoryStore;
    use serde_json::json;
    use std::time::Duration;

    fn smoke(flag: bool) -> StoreEvent {
        StoreEvent::Value(json!({"SmokeIndicator": flag}))
    }

    #[test]
    fn test_partial_record_end_to_end() {
        let mut state = DashboardState::new(20);
        state.apply(StoreEvent::Value(json!({"Speedometer": 42.3})), Utc::now());

        let snapshot = state.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.speed_kmh, 42.3);
        assert_eq!(snapshot.battery.soc_percent, 0.0);
        assert_eq!(snapshot.odometer_km, 0.0);
        assert!(!snapshot.indicators.left_turn);
        assert!(!snapshot.safety.accident_alert);
        assert_eq!(state.link, LinkStatus::Live);
        assert_eq!(state.history.speed.to_vec(), vec![42.3]);
    }

    #[test]
    fn test_smoke_sequence_without_dismissal() {
        let mut state = DashboardState::new(20);
        let now = Utc::now();

        assert!(state.apply(smoke(false), now).is_empty());
        assert_eq!(state.apply(smoke(true), now), vec![AlertKind::Smoke]);
        assert!(state.apply(smoke(true), now).is_empty());
        assert!(state.apply(smoke(false), now).is_empty());
        assert_eq!(state.alerts.state(AlertKind::Smoke), AlertState::Open);
    }

    #[test]
    fn test_each_value_replaces_snapshot_without_merge() {
        let mut state = DashboardState::new(20);
        let now = Utc::now();
        state.apply(StoreEvent::Value(json!({"Speedometer": 30, "Battery": 70})), now);
        state.apply(StoreEvent::Value(json!({"Speedometer": 31})), now);

        let snapshot = state.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.speed_kmh, 31.0);
        assert_eq!(snapshot.battery.soc_percent, 0.0);
        assert_eq!(state.updates, 2);
    }

    #[test]
    fn test_no_data_and_disconnect_keep_last_snapshot() {
        let mut state = DashboardState::new(20);
        let now = Utc::now();

        state.apply(StoreEvent::Disconnected("offline".into()), now);
        assert_eq!(state.link, LinkStatus::Connecting);

        state.apply(StoreEvent::Value(json!({"Battery": 55})), now);
        state.apply(StoreEvent::Disconnected("offline".into()), now);
        assert_eq!(state.link, LinkStatus::Stale);
        assert_eq!(state.snapshot.as_ref().unwrap().battery.soc_percent, 55.0);

        state.apply(StoreEvent::NoData, now);
        assert_eq!(state.link, LinkStatus::NoData);
        assert!(state.snapshot.is_some());
        assert_eq!(state.history.soc.len(), 1);
    }

    #[test]
    fn test_non_record_value_adds_no_history() {
        let mut state = DashboardState::new(20);
        let now = Utc::now();
        state.apply(StoreEvent::Value(json!({"Speedometer": 25, "Battery": 61})), now);

        for raw in [json!(0), json!("offline"), json!([1, 2, 3]), json!(true)] {
            assert!(state.apply(StoreEvent::Value(raw), now).is_empty());
            assert_eq!(state.link, LinkStatus::NoData);
        }

        assert_eq!(state.history.speed.to_vec(), vec![25.0]);
        assert_eq!(state.history.soc.to_vec(), vec![61.0]);
        assert_eq!(state.snapshot.as_ref().unwrap().speed_kmh, 25.0);
        assert_eq!(state.updates, 1);
    }

    #[tokio::test]
    async fn test_run_follows_store_until_shutdown() {
        let store = Arc::new(MemoryStore::with_value(json!({"bike": {"Speedometer": 18}})));
        let service = Arc::new(TelemetrySyncService::new(store.clone(), "bike", 20));
        let mut rx = service.watch();
        let shutdown = CancellationToken::new();

        let task = tokio::spawn({
            let service = service.clone();
            let shutdown = shutdown.clone();
            async move { service.run(shutdown).await }
        });

        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.updates == 1))
            .await
            .unwrap()
            .unwrap();

        store.set("bike/SmokeIndicator", json!(true)).unwrap();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.updates == 2))
            .await
            .unwrap()
            .unwrap();

        let state = service.current();
        assert_eq!(state.snapshot.as_ref().unwrap().speed_kmh, 18.0);
        assert_eq!(state.alerts.state(AlertKind::Smoke), AlertState::Open);
        assert_eq!(state.history.speed.to_vec(), vec![18.0, 18.0]);

        assert!(service.dismiss_alert(AlertKind::Smoke));
        assert!(!service.dismiss_alert(AlertKind::Smoke));

        shutdown.cancel();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_run_marks_stale_when_store_closes() {
        let store = Arc::new(MemoryStore::with_value(json!({"Battery": 64})));
        let service = TelemetrySyncService::new(store.clone(), "", 20);
        let mut rx = service.watch();

        let (result, _) = tokio::join!(service.run(CancellationToken::new()), async {
            rx.wait_for(|s| s.updates == 1).await.unwrap();
            store.close().await;
        });

        result.unwrap();
        assert_eq!(service.current().link, LinkStatus::Stale);
    }

    #[tokio::test]
    async fn test_run_fails_on_closed_store() {
        let store = Arc::new(MemoryStore::new());
        store.close().await;
        let service = TelemetrySyncService::new(store, "", 20);

        assert!(service.run(CancellationToken::new()).await.is_err());
    }
}
