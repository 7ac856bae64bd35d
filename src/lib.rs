// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod location;
pub mod records;
pub mod runtime;
pub mod scheduler;
pub mod session;
