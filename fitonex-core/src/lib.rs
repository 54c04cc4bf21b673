//! FitONEX Core - Foundation crate for the FitONEX backend
//!
//! This crate provides the building blocks shared by the API server:
//!
//! # Modules
//!
//! - [`config`] — Strongly-typed configuration with TOML and environment variable support
//! - [`domain`] — Cursor pagination: opaque cursors and page assembly
//! - [`infrastructure`] — SQL keyset helpers and the token bucket rate limiter
//! - [`logging`] — Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! fitonex-core/
//! ├── domain/
//! │   └── pagination/      # Cursor codec, page builder
//! ├── infrastructure/
//! │   ├── pagination/      # PostgreSQL keyset predicates
//! │   └── rate_limiter/    # Token bucket over Redis or memory
//! └── config/              # Configuration management
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use fitonex_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `FITONEX__` prefix with double underscore separators:
//!
//! ```bash
//! FITONEX__SERVER__PORT=3000
//! FITONEX__RATE_LIMIT__STORAGE_BACKEND=memory
//! ```
//!
//! # Pagination
//!
//! ```rust,ignore
//! use fitonex_core::domain::pagination::{TimeDescCursor, time_desc_page};
//!
//! // rows were fetched with LIMIT limit + 1
//! let page = time_desc_page(rows, limit, |row| TimeDescCursor::new(row.created_at, row.id.clone()))?;
//! ```
//!
//! # Logging
//!
//! ```rust,ignore
//! use fitonex_core::init_tracing;
//!
//! init_tracing(&config.logging)?;
//! ```

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
