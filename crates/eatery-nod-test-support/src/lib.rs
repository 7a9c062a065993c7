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

//! Shared test helpers used across the bootstrap suites.
//! Layout: fixtures.rs (tasks and contexts), mocks.rs (recording sink and reporter).

pub mod fixtures;
pub mod mocks;
