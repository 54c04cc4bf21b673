//! Fitonex API - Main application library
//!
//! Wires the core crate (configuration, pagination, rate limiting) into the
//! HTTP layer.

mod app;
pub mod presentation;

pub use app::{AppHandle, create_app};
pub use fitonex_core::{Config, init_tracing};

// Re-export for convenience
pub use fitonex_core;
