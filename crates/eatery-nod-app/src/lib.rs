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

//! eatery-nod application bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (service wiring and run loop), `features/` (kick-starts
//! contributed by device, backend and auth), `error.rs` (application errors).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application-level errors.
pub mod error;
/// Features contributing kick-start tasks.
pub mod features;

pub use bootstrap::{BootOutcome, BootstrapDependencies, run_app, run_app_with};
pub use error::{AppError, AppResult};
