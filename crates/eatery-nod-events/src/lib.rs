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

//! Event bus for the eatery-nod bootstrap.
//!
//! The bus carries typed bootstrap events (status changes, the terminal ready
//! signal, and user-facing error disclosures), assigns sequential identifiers,
//! and keeps a bounded replay ring so late subscribers (a splash screen that
//! mounts after the first status was emitted) can catch up. Internally it uses
//! `tokio::broadcast`; when the channel overflows, the oldest events are dropped.
//!
//! Layout: `payloads.rs` (event types and kind discriminators), `routing.rs`
//! (bus), `error.rs` (publish failures).

pub mod error;
pub mod payloads;
pub mod routing;

pub use error::{EventBusError, EventBusResult};
pub use payloads::{DEFAULT_REPLAY_CAPACITY, Event, EventEnvelope, EventId, READY_STATUS};
pub use routing::{EventBus, EventStream};
