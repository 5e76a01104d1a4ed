// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod json_tree;
pub mod memory_store;
pub mod mock_store;
pub mod rtdb_client;
pub mod sse;
pub mod wire_record;
