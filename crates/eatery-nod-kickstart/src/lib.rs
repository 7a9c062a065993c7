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

//! Bootstrap sequencing for eatery-nod.
//!
//! Features contribute named asynchronous kick-start tasks. The
//! [`BootstrapSequencer`] launches them all at once, publishes the label of
//! the earliest unfinished task as the human-readable status, discloses task
//! failures, and emits a single terminal ready signal once every task has
//! settled in a way that permits progress.
//!
//! Layout: `task.rs` (task wrapper and invoke context), `services.rs`
//! (cross-feature service registry), `registry.rs` (explicit feature
//! registration), `disclosure.rs` (error context and reporter), `sink.rs`
//! (status sinks), `status.rs` (status projection), `sequencer.rs` (the run
//! driver), `error.rs` (configuration errors).

pub mod disclosure;
pub mod error;
pub mod registry;
pub mod sequencer;
pub mod services;
pub mod sink;
pub mod status;
pub mod task;

pub use disclosure::{
    ATTEMPTING_TO_CONNECTIVE, DiscloseOptions, Discloser, DisclosableError, ErrorReporter,
    UNEXPECTED_CLIENT_MESSAGE,
};
pub use error::{KickStartError, KickStartResult};
pub use registry::{Feature, TaskRegistry};
pub use sequencer::{BootstrapSequencer, RunOutcome, RunPhase, SequencerHandle};
pub use services::ServiceRegistry;
pub use sink::{FanoutSink, StatusSink};
pub use status::{BootStatus, StatusProjection, StatusWatcher};
pub use task::{KickStartContext, KickStartFuture, KickStartTask};
