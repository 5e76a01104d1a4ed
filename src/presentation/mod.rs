// Presentation layer - HTTP routes over the dashboard use cases
pub mod app_state;
pub mod handlers;
pub mod router;
