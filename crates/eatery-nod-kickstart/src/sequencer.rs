//! Bootstrap sequencer.
//!
//! # Design
//! - Every kick-start is spawned in the same pass; a single driver receives
//!   their settlements one at a time, so run state has exactly one owner.
//! - Status always names the lowest-index incomplete task.
//! - Expected failures count as complete; unexpected failures never do and
//!   stall the run. There is no timeout and no cancellation.
//! - The terminal `READY` + completion pair is emitted at most once per run.

use std::sync::Arc;

use eatery_nod_events::READY_STATUS;
use eatery_nod_telemetry::{KickStartOutcome, Metrics};
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::disclosure::{DiscloseOptions, DisclosableError, ErrorReporter};
use crate::error::{KickStartError, KickStartResult};
use crate::sink::StatusSink;
use crate::task::{KickStartContext, KickStartTask};

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Tasks have not been launched.
    NotStarted,
    /// At least one task is incomplete.
    Running,
    /// The terminal signal was emitted.
    Ready,
}

/// How a run ended once every task settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every task completed and the ready signal was emitted.
    Ready,
    /// Unexpected failures left tasks incomplete; readiness was never signalled.
    Stalled {
        /// Labels of the incomplete tasks, in registration order.
        pending: Vec<String>,
    },
}

/// Runs kick-start tasks to readiness and publishes progress.
#[derive(Clone)]
pub struct BootstrapSequencer {
    emitter: Emitter,
    reporter: Arc<dyn ErrorReporter>,
}

impl BootstrapSequencer {
    /// Build a sequencer publishing to `sink` and disclosing failures to `reporter`.
    #[must_use]
    pub fn new(
        sink: Arc<dyn StatusSink>,
        reporter: Arc<dyn ErrorReporter>,
        metrics: Metrics,
    ) -> Self {
        Self {
            emitter: Emitter { sink, metrics },
            reporter,
        }
    }

    /// Launch a run over `tasks` and return without waiting for any of them.
    ///
    /// The first status (or, for an empty list, the terminal pair) is emitted
    /// before this returns. Everything after that arrives through the sink.
    ///
    /// # Errors
    ///
    /// Returns [`KickStartError::RuntimeUnavailable`] when `tasks` is not
    /// empty and no Tokio runtime is available to launch them.
    pub fn run(
        &self,
        tasks: &[KickStartTask],
        context: &KickStartContext,
    ) -> KickStartResult<SequencerHandle> {
        let run_id = Uuid::new_v4();
        let span = info_span!("kickstart.run", run_id = %run_id, tasks = tasks.len());
        let _entered = span.enter();
        self.emitter.metrics.inc_bootstrap_run();

        let Some(first) = tasks.first() else {
            info!("no kick-start tasks registered");
            self.emitter.ready();
            return Ok(SequencerHandle::settled(run_id, RunOutcome::Ready));
        };
        let runtime = Handle::try_current().map_err(|_| KickStartError::RuntimeUnavailable)?;

        let mut state = RunState::new(tasks);
        state.reset();
        state.phase = RunPhase::Running;
        self.emitter.status(first.label());
        self.emitter.metrics.set_outstanding(state.outstanding());

        let mut in_flight = JoinSet::new();
        for (index, task) in tasks.iter().enumerate() {
            let work = runtime.spawn(task.invoke(context.clone()));
            in_flight.spawn_on(async move { (index, settle_join(work.await)) }, &runtime);
        }
        debug!("kick-start tasks launched");

        let driver = RunDriver {
            emitter: self.emitter.clone(),
            reporter: Arc::clone(&self.reporter),
            state,
            in_flight,
        };
        let handle = runtime.spawn(driver.drive().instrument(span.clone()));
        Ok(SequencerHandle {
            run_id,
            state: HandleState::Driving(handle),
        })
    }
}

/// Observation handle for a launched run.
///
/// Dropping the handle does not cancel the run.
pub struct SequencerHandle {
    run_id: Uuid,
    state: HandleState,
}

enum HandleState {
    Settled(RunOutcome),
    Driving(JoinHandle<RunOutcome>),
}

impl SequencerHandle {
    const fn settled(run_id: Uuid, outcome: RunOutcome) -> Self {
        Self {
            run_id,
            state: HandleState::Settled(outcome),
        }
    }

    /// Identifier recorded on the run's tracing span.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Wait until every task has settled and report how the run ended.
    ///
    /// A run with a pending task that never settles never resolves this.
    ///
    /// # Errors
    ///
    /// Returns [`KickStartError::DriverJoin`] if the driver terminated abnormally.
    pub async fn wait(self) -> KickStartResult<RunOutcome> {
        match self.state {
            HandleState::Settled(outcome) => Ok(outcome),
            HandleState::Driving(handle) => handle.await.map_err(|source| {
                KickStartError::DriverJoin {
                    run_id: self.run_id,
                    source,
                }
            }),
        }
    }
}

#[derive(Clone)]
struct Emitter {
    sink: Arc<dyn StatusSink>,
    metrics: Metrics,
}

impl Emitter {
    fn status(&self, message: &str) {
        self.metrics.inc_event("status_changed");
        self.sink.status_changed(message);
    }

    fn ready(&self) {
        self.status(READY_STATUS);
        self.metrics.inc_event("sequence_complete");
        self.sink.sequence_complete();
        self.metrics.inc_bootstrap_ready();
        info!("bootstrap sequence complete");
    }
}

struct TaskSlot {
    label: String,
    complete: bool,
}

struct RunState {
    slots: Vec<TaskSlot>,
    phase: RunPhase,
}

impl RunState {
    fn new(tasks: &[KickStartTask]) -> Self {
        Self {
            slots: tasks
                .iter()
                .map(|task| TaskSlot {
                    label: task.label().to_string(),
                    complete: false,
                })
                .collect(),
            phase: RunPhase::NotStarted,
        }
    }

    fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.complete = false;
        }
    }

    fn outstanding(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.complete).count()
    }

    fn first_incomplete(&self) -> Option<&str> {
        self.slots
            .iter()
            .find(|slot| !slot.complete)
            .map(|slot| slot.label.as_str())
    }

    fn pending_labels(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|slot| !slot.complete)
            .map(|slot| slot.label.clone())
            .collect()
    }
}

struct RunDriver {
    emitter: Emitter,
    reporter: Arc<dyn ErrorReporter>,
    state: RunState,
    in_flight: JoinSet<(usize, Result<(), DisclosableError>)>,
}

impl RunDriver {
    async fn drive(mut self) -> RunOutcome {
        while let Some(joined) = self.in_flight.join_next().await {
            match joined {
                Ok((index, result)) => self.settle(index, result),
                Err(err) => warn!(error = %err, "kick-start watcher terminated"),
            }
        }

        if self.state.phase == RunPhase::Ready {
            RunOutcome::Ready
        } else {
            let pending = self.state.pending_labels();
            error!(
                pending = ?pending,
                "bootstrap stalled on unexpected kick-start failures"
            );
            RunOutcome::Stalled { pending }
        }
    }

    fn settle(&mut self, index: usize, result: Result<(), DisclosableError>) {
        let Some(slot) = self.state.slots.get_mut(index) else {
            warn!(index, "settlement for unknown kick-start ignored");
            return;
        };

        match result {
            Ok(()) => {
                slot.complete = true;
                self.emitter.metrics.inc_kickstart(KickStartOutcome::Completed);
                debug!(task = %slot.label, "kick-start completed");
            }
            Err(err) => {
                let outcome = if err.is_unexpected() {
                    KickStartOutcome::UnexpectedFailure
                } else {
                    slot.complete = true;
                    KickStartOutcome::ExpectedFailure
                };
                self.emitter.metrics.inc_kickstart(outcome);
                let err = err.attempting_to(slot.label.clone());
                self.reporter.disclose(&err, DiscloseOptions::logged());
            }
        }

        self.emitter.metrics.set_outstanding(self.state.outstanding());
        self.advance();
    }

    fn advance(&mut self) {
        if let Some(label) = self.state.first_incomplete() {
            self.emitter.status(label);
            return;
        }
        if self.state.phase != RunPhase::Ready {
            self.state.phase = RunPhase::Ready;
            self.emitter.ready();
        }
    }
}

fn settle_join(
    joined: Result<Result<(), DisclosableError>, JoinError>,
) -> Result<(), DisclosableError> {
    joined.unwrap_or_else(|err| Err(DisclosableError::from_source(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks(labels: &[&str]) -> Vec<KickStartTask> {
        labels
            .iter()
            .map(|label| KickStartTask::new(*label, |_| async { Ok(()) }).expect("valid label"))
            .collect()
    }

    #[test]
    fn first_incomplete_prefers_lowest_index() {
        let mut state = RunState::new(&tasks(&["A", "B", "C"]));
        assert_eq!(state.first_incomplete(), Some("A"));
        state.slots[1].complete = true;
        assert_eq!(state.first_incomplete(), Some("A"));
        state.slots[0].complete = true;
        assert_eq!(state.first_incomplete(), Some("C"));
        assert_eq!(state.outstanding(), 1);
        state.slots[2].complete = true;
        assert_eq!(state.first_incomplete(), None);
    }

    #[test]
    fn reset_clears_completion_flags() {
        let mut state = RunState::new(&tasks(&["A", "B"]));
        state.slots[0].complete = true;
        state.reset();
        assert_eq!(state.outstanding(), 2);
        assert_eq!(state.pending_labels(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn join_failures_become_unexpected() {
        let ok = settle_join(Ok(Ok(())));
        assert!(ok.is_ok());
        let expected = settle_join(Ok(Err(DisclosableError::expected("denied"))));
        assert!(!expected.expect_err("failure").is_unexpected());
    }

    async fn explode() -> Result<(), DisclosableError> {
        panic!("kick-start exploded")
    }

    #[tokio::test]
    async fn panicking_task_is_treated_as_unexpected() {
        let err = settle_join(tokio::spawn(explode()).await).expect_err("panic surfaces as failure");
        assert!(err.is_unexpected());
    }

    #[test]
    fn run_without_runtime_fails_fast_for_non_empty_lists()
    -> Result<(), Box<dyn std::error::Error>> {
        struct Silent;
        impl StatusSink for Silent {
            fn status_changed(&self, _message: &str) {}
            fn sequence_complete(&self) {}
        }
        impl ErrorReporter for Silent {
            fn disclose(&self, _error: &DisclosableError, _options: DiscloseOptions) {}
        }

        let sequencer =
            BootstrapSequencer::new(Arc::new(Silent), Arc::new(Silent), Metrics::new()?);
        let (_projection, watcher) = crate::status::StatusProjection::new();
        let context = KickStartContext::new(
            eatery_nod_events::EventBus::new(),
            watcher,
            crate::services::ServiceRegistry::new(),
        );

        let empty = sequencer.run(&[], &context)?;
        assert!(!empty.run_id().is_nil());

        assert!(matches!(
            sequencer.run(&tasks(&["A"]), &context),
            Err(KickStartError::RuntimeUnavailable)
        ));
        Ok(())
    }
}
