#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Environment-driven configuration for the eatery-nod application.
//!
//! Layout: `defaults.rs` (constants), `model.rs` (typed configuration),
//! `loader.rs` (environment parsing), `error.rs` (validation failures).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use model::{AppConfig, BackendConfig, LocationPermissionSetting};
