// Application layer - Use cases over the realtime store
pub mod dashboard_service;
pub mod mock_generator;
pub mod profile_service;
pub mod realtime_store;
pub mod store_key;
pub mod subscription;
pub mod sync_service;
