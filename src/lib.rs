// Library root - Layers shared by the server binary and its tests
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
