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
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Binary entrypoint that runs the eatery-nod bootstrap sequence.

use eatery_nod_app::{AppResult, run_app};

/// Boots the application and blocks until it is ready or interrupted.
#[tokio::main]
async fn main() -> AppResult<()> {
    run_app().await
}
