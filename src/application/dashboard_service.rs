// Dashboard service - Use case for reading and streaming the dashboard view
use crate::application::sync_service::TelemetrySyncService;
use crate::domain::alert::AlertKind;
use crate::domain::dashboard::DashboardView;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct DashboardService {
    sync: Arc<TelemetrySyncService>,
    shutdown: CancellationToken,
}

impl DashboardService {
    pub fn new(sync: Arc<TelemetrySyncService>, shutdown: CancellationToken) -> Self {
        Self { sync, shutdown }
    }

    pub fn get_dashboard(&self) -> DashboardView {
        self.sync.current().view()
    }

    /// Current view followed by one view per state change. Ends on shutdown.
    pub fn stream_dashboard(&self) -> BoxStream<'static, DashboardView> {
        WatchStream::new(self.sync.watch())
            .map(|state| state.view())
            .take_until(self.shutdown.clone().cancelled_owned())
            .boxed()
    }

    pub fn dismiss_alert(&self, kind: AlertKind) -> bool {
        self.sync.dismiss_alert(kind)
    }
}
