use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use eatery_nod_events::{Event, EventBus, READY_STATUS};
use eatery_nod_kickstart::{
    BootstrapSequencer, DisclosableError, Discloser, FanoutSink, KickStartTask, RunOutcome,
    SequencerHandle,
};
use eatery_nod_telemetry::Metrics;
use eatery_nod_test_support::fixtures::{Settlement, gated_task, settled_task, test_context};
use eatery_nod_test_support::mocks::{RecordingReporter, RecordingSink, SinkRecord};
use tokio::time::timeout;
use tokio_stream::StreamExt;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    sequencer: BootstrapSequencer,
    sink: Arc<RecordingSink>,
    reporter: Arc<RecordingReporter>,
    metrics: Metrics,
}

fn harness() -> Result<Harness> {
    let sink = Arc::new(RecordingSink::new());
    let reporter = Arc::new(RecordingReporter::new());
    let metrics = Metrics::new()?;
    let sequencer = BootstrapSequencer::new(sink.clone(), reporter.clone(), metrics.clone());
    Ok(Harness {
        sequencer,
        sink,
        reporter,
        metrics,
    })
}

async fn outcome(handle: SequencerHandle) -> Result<RunOutcome> {
    let outcome = timeout(WAIT, handle.wait())
        .await
        .context("run did not settle in time")??;
    Ok(outcome)
}

fn status(message: &str) -> SinkRecord {
    SinkRecord::status(message)
}

#[tokio::test]
async fn empty_task_list_is_ready_immediately() -> Result<()> {
    let h = harness()?;
    let (context, _projection) = test_context();

    let handle = h.sequencer.run(&[], &context)?;
    assert_eq!(h.sink.records(), vec![status(READY_STATUS), SinkRecord::Complete]);
    assert_eq!(outcome(handle).await?, RunOutcome::Ready);
    assert!(h.reporter.disclosures().is_empty());
    Ok(())
}

#[tokio::test]
async fn single_task_reports_its_label_then_ready() -> Result<()> {
    let h = harness()?;
    let (context, _projection) = test_context();
    let (task, gate) = gated_task("A")?;

    let handle = h.sequencer.run(&[task], &context)?;
    assert_eq!(h.sink.records(), vec![status("A")]);

    gate.succeed();
    assert_eq!(outcome(handle).await?, RunOutcome::Ready);
    assert_eq!(
        h.sink.records(),
        vec![status("A"), status(READY_STATUS), SinkRecord::Complete]
    );
    assert_eq!(gate.invocations(), 1);
    Ok(())
}

#[tokio::test]
async fn status_names_lowest_index_incomplete_task() -> Result<()> {
    let h = harness()?;
    let (context, _projection) = test_context();
    let (first, first_gate) = gated_task("A")?;
    let (second, second_gate) = gated_task("B")?;
    let (third, third_gate) = gated_task("C")?;

    let handle = h.sequencer.run(&[first, second, third], &context)?;

    second_gate.succeed();
    let records = h.sink.wait_for_len(2).await?;
    assert_eq!(records, vec![status("A"), status("A")]);

    first_gate.succeed();
    let records = h.sink.wait_for_len(3).await?;
    assert_eq!(records, vec![status("A"), status("A"), status("C")]);

    third_gate.succeed();
    assert_eq!(outcome(handle).await?, RunOutcome::Ready);
    assert_eq!(
        h.sink.records(),
        vec![
            status("A"),
            status("A"),
            status("C"),
            status(READY_STATUS),
            SinkRecord::Complete,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn expected_failure_counts_as_complete() -> Result<()> {
    let h = harness()?;
    let (context, _projection) = test_context();
    let (first, first_gate) = gated_task("A")?;
    let (second, second_gate) = gated_task("B")?;

    let handle = h.sequencer.run(&[first, second], &context)?;

    first_gate.release(Settlement::expected("Location permission denied"));
    let records = h.sink.wait_for_len(2).await?;
    assert_eq!(records, vec![status("A"), status("B")]);

    let disclosures = h.reporter.disclosures();
    assert_eq!(disclosures.len(), 1);
    assert_eq!(disclosures[0].client_message, "Location permission denied");
    assert_eq!(disclosures[0].clauses, vec!["A".to_string()]);
    assert_eq!(disclosures[0].attempting_to, "attempting to: A");
    assert!(!disclosures[0].unexpected);
    assert!(disclosures[0].log_it);

    second_gate.succeed();
    assert_eq!(outcome(handle).await?, RunOutcome::Ready);
    assert_eq!(h.sink.completions(), 1);
    Ok(())
}

#[tokio::test]
async fn unexpected_failure_stalls_the_run() -> Result<()> {
    let h = harness()?;
    let (context, _projection) = test_context();
    let (first, first_gate) = gated_task("A")?;
    let (second, second_gate) = gated_task("B")?;

    let handle = h.sequencer.run(&[first, second], &context)?;

    first_gate.release(Settlement::unexpected("backend exploded"));
    assert_eq!(h.sink.wait_for_len(2).await?, vec![status("A"), status("A")]);

    second_gate.succeed();
    assert_eq!(
        outcome(handle).await?,
        RunOutcome::Stalled {
            pending: vec!["A".to_string()],
        }
    );
    assert_eq!(
        h.sink.records(),
        vec![status("A"), status("A"), status("A")]
    );
    assert_eq!(h.sink.completions(), 0);

    let disclosures = h.reporter.disclosures();
    assert_eq!(disclosures.len(), 1);
    assert!(disclosures[0].unexpected);
    assert_eq!(disclosures[0].clauses, vec!["A".to_string()]);
    Ok(())
}

#[tokio::test]
async fn terminal_signal_is_emitted_once_for_simultaneous_settlements() -> Result<()> {
    let h = harness()?;
    let (context, _projection) = test_context();
    let tasks = (0..32)
        .map(|index| {
            let settlement = if index % 5 == 0 {
                Settlement::expected("skipped")
            } else {
                Settlement::Succeed
            };
            settled_task(&format!("task {index}"), settlement)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let handle = h.sequencer.run(&tasks, &context)?;
    assert_eq!(outcome(handle).await?, RunOutcome::Ready);

    let records = h.sink.records();
    assert_eq!(records.first(), Some(&status("task 0")));
    assert_eq!(h.sink.completions(), 1);
    assert_eq!(
        records
            .iter()
            .filter(|record| **record == status(READY_STATUS))
            .count(),
        1
    );
    assert_eq!(records[records.len() - 2..], [status(READY_STATUS), SinkRecord::Complete]);
    assert_eq!(h.reporter.disclosures().len(), 7);
    Ok(())
}

#[tokio::test]
async fn task_clauses_are_kept_ahead_of_the_label() -> Result<()> {
    let h = harness()?;
    let (context, _projection) = test_context();
    let task = KickStartTask::new("Initializing the backend service", |_| async {
        Err(DisclosableError::expected("Backend is unreachable").attempting_to("fetch the project"))
    })?;

    let handle = h.sequencer.run(&[task], &context)?;
    assert_eq!(outcome(handle).await?, RunOutcome::Ready);

    let disclosures = h.reporter.disclosures();
    assert_eq!(disclosures.len(), 1);
    assert_eq!(
        disclosures[0].clauses,
        vec![
            "fetch the project".to_string(),
            "Initializing the backend service".to_string(),
        ]
    );
    assert_eq!(
        disclosures[0].attempting_to,
        "attempting to: fetch the project\nattempting to: Initializing the backend service"
    );
    Ok(())
}

#[tokio::test]
async fn failures_are_disclosed_once_regardless_of_observers() -> Result<()> {
    let first_sink = Arc::new(RecordingSink::new());
    let second_sink = Arc::new(RecordingSink::new());
    let fanout = FanoutSink::new()
        .with(first_sink.clone())
        .with(second_sink.clone());
    let reporter = Arc::new(RecordingReporter::new());
    let sequencer = BootstrapSequencer::new(Arc::new(fanout), reporter.clone(), Metrics::new()?);
    let (context, _projection) = test_context();

    let tasks = vec![
        settled_task("A", Settlement::expected("denied"))?,
        settled_task("B", Settlement::Succeed)?,
    ];
    let handle = sequencer.run(&tasks, &context)?;
    assert_eq!(outcome(handle).await?, RunOutcome::Ready);

    assert_eq!(reporter.disclosures().len(), 1);
    assert_eq!(first_sink.records(), second_sink.records());
    assert_eq!(first_sink.completions(), 1);
    Ok(())
}

#[tokio::test]
async fn bus_observers_see_disclosure_before_the_next_status() -> Result<()> {
    let bus = EventBus::new();
    let mut stream = bus.subscribe();
    let sequencer = BootstrapSequencer::new(
        Arc::new(bus.clone()),
        Arc::new(Discloser::new(bus.clone())),
        Metrics::new()?,
    );
    let (context, _projection) = test_context();
    let task = settled_task("Waiting for location permission", Settlement::expected("denied"))?;

    let handle = sequencer.run(&[task], &context)?;
    assert_eq!(outcome(handle).await?, RunOutcome::Ready);

    let mut events = Vec::new();
    for _ in 0..4 {
        let envelope = timeout(WAIT, stream.next())
            .await
            .context("event stream stalled")?
            .context("event stream closed")??;
        events.push(envelope.event);
    }
    assert_eq!(
        events,
        vec![
            Event::status("Waiting for location permission"),
            Event::ErrorDisclosed {
                client_message: "denied".to_string(),
                attempting_to: vec!["Waiting for location permission".to_string()],
                unexpected: false,
            },
            Event::status(READY_STATUS),
            Event::SequenceComplete,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn projection_tracks_the_run_until_ready() -> Result<()> {
    let h = harness()?;
    let (context, projection) = test_context();
    let mut watcher = projection.watcher();
    let projection = Arc::new(projection);
    let fanout = FanoutSink::new()
        .with(h.sink.clone())
        .with(projection.clone());
    let sequencer = BootstrapSequencer::new(Arc::new(fanout), h.reporter.clone(), h.metrics.clone());
    let (task, gate) = gated_task("Loading device resources")?;

    let handle = sequencer.run(&[task], &context)?;
    assert_eq!(watcher.current().status, "Loading device resources");
    assert!(!watcher.current().ready);

    gate.succeed();
    let status = timeout(WAIT, watcher.wait_ready()).await??;
    assert!(status.ready);
    assert!(status.shows_ready());
    assert_eq!(outcome(handle).await?, RunOutcome::Ready);
    Ok(())
}

#[tokio::test]
async fn each_run_starts_from_scratch() -> Result<()> {
    let h = harness()?;
    let (context, _projection) = test_context();
    let (task, gate) = gated_task("A")?;
    gate.succeed();
    let tasks = vec![task];

    let first = h.sequencer.run(&tasks, &context)?;
    assert_eq!(outcome(first).await?, RunOutcome::Ready);
    let second = h.sequencer.run(&tasks, &context)?;
    assert_eq!(outcome(second).await?, RunOutcome::Ready);

    assert_eq!(gate.invocations(), 2);
    assert_eq!(h.sink.completions(), 2);
    assert_eq!(
        h.sink.records(),
        vec![
            status("A"),
            status(READY_STATUS),
            SinkRecord::Complete,
            status("A"),
            status(READY_STATUS),
            SinkRecord::Complete,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn metrics_follow_settlement_outcomes() -> Result<()> {
    let h = harness()?;
    let (context, _projection) = test_context();
    let tasks = vec![
        settled_task("A", Settlement::Succeed)?,
        settled_task("B", Settlement::expected("denied"))?,
        settled_task("C", Settlement::unexpected("boom"))?,
    ];

    let handle = h.sequencer.run(&tasks, &context)?;
    assert!(matches!(outcome(handle).await?, RunOutcome::Stalled { .. }));

    let snapshot = h.metrics.snapshot();
    assert_eq!(snapshot.bootstrap_runs_total, 1);
    assert_eq!(snapshot.bootstrap_ready_total, 0);
    assert_eq!(snapshot.kickstart_completed_total, 1);
    assert_eq!(snapshot.kickstart_expected_failures_total, 1);
    assert_eq!(snapshot.kickstart_unexpected_failures_total, 1);
    assert_eq!(snapshot.kickstart_outstanding, 1);
    Ok(())
}
