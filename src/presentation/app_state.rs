// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::profile_service::ProfileService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub profile_service: ProfileService,
}
