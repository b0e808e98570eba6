use niagara_progress::{
    ManualClock, MemorySink, OutcomeKind, ProgressConfig, ProgressError, ProgressReporter,
    ProgressSink, RunState, ThrottlePolicy,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Helper to build a reporter on a manual clock and an in-memory sink
fn create_test_reporter(throttle: ThrottlePolicy) -> (ProgressReporter, MemorySink, Arc<ManualClock>) {
    let sink = MemorySink::new();
    let clock = Arc::new(ManualClock::new());
    let reporter = ProgressReporter::with_sink(
        ProgressConfig::default().with_throttle(throttle),
        sink.clone(),
    )
    .with_clock(clock.clone());
    (reporter, sink, clock)
}

/// Sink whose output stream is gone
struct BrokenSink;

impl ProgressSink for BrokenSink {
    fn write_frame(&mut self, _frame: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }
}

#[test]
fn test_completed_matches_tallies_after_every_report() {
    let (reporter, _sink, _clock) = create_test_reporter(ThrottlePolicy::default());
    reporter.begin(30).unwrap();

    for i in 0..30 {
        let outcome = OutcomeKind::ALL[i % 3];
        reporter.report(outcome).unwrap();

        let snapshot = reporter.snapshot().expect("run has state");
        assert_eq!(snapshot.completed, snapshot.tallies.sum());
        assert!(snapshot.completed <= snapshot.total);
    }

    let snapshot = reporter.snapshot().unwrap();
    assert_eq!(snapshot.tallies.ok, 10);
    assert_eq!(snapshot.tallies.empty, 10);
    assert_eq!(snapshot.tallies.fail, 10);
}

#[test]
fn test_report_past_total_is_rejected() {
    let (reporter, _sink, _clock) = create_test_reporter(ThrottlePolicy::default());
    reporter.begin(2).unwrap();
    reporter.report(OutcomeKind::Ok).unwrap();
    reporter.report(OutcomeKind::Ok).unwrap();

    let err = reporter.report(OutcomeKind::Fail).unwrap_err();
    assert!(matches!(err, ProgressError::InvalidState { .. }));

    let snapshot = reporter.snapshot().unwrap();
    assert_eq!(snapshot.completed, 2);
    assert_eq!(snapshot.tallies.fail, 0);
}

#[test]
fn test_reference_run_percentage() {
    let (reporter, sink, _clock) = create_test_reporter(ThrottlePolicy::default());
    reporter.begin(6272).unwrap();

    for _ in 0..1890 {
        reporter.report(OutcomeKind::Ok).unwrap();
    }
    for _ in 0..158 {
        reporter.report(OutcomeKind::Empty).unwrap();
    }

    // 2048 / 6272 = 32.653..%, formatted with round-to-nearest at one decimal
    let snapshot = reporter.snapshot().unwrap();
    assert_eq!(format!("{:.1}", snapshot.percent()), "32.7");

    reporter.finish().unwrap();
    let line = sink.last_line().expect("a line was drawn");
    assert!(line.contains("2048/6272"), "line was: {line}");
    assert!(line.contains("32.7%"), "line was: {line}");
    assert!(line.contains("OK:1890 EMPTY:158  FAIL:0"), "line was: {line}");
}

#[test]
fn test_throughput_over_ten_seconds() {
    let (reporter, sink, clock) = create_test_reporter(ThrottlePolicy::items_only(1));
    reporter.begin(1000).unwrap();

    // First report at t=0, the 412th at exactly t=10s
    let span = Duration::from_secs(10);
    let mut now = Duration::ZERO;
    for i in 0..412u32 {
        let at = span * i / 411;
        clock.advance(at - now);
        now = at;
        reporter.report(OutcomeKind::Ok).unwrap();
    }
    assert_eq!(clock.elapsed(), span);

    let snapshot = reporter.snapshot().unwrap();
    assert_eq!(format!("{:.1}", snapshot.rate()), "41.2");

    reporter.finish().unwrap();
    let line = sink.last_line().unwrap();
    assert!(line.ends_with("41.2/s"), "line was: {line}");
}

#[test]
fn test_rate_is_zero_before_first_item() {
    let (reporter, sink, clock) = create_test_reporter(ThrottlePolicy::default());
    reporter.begin(10).unwrap();
    clock.advance(Duration::from_secs(3));

    assert_eq!(reporter.snapshot().unwrap().rate(), 0.0);
    let line = sink.last_line().unwrap();
    assert!(line.ends_with("0.0/s"), "line was: {line}");
}

#[test]
fn test_finish_is_idempotent() {
    let run = |finish_calls: usize| {
        let (reporter, sink, _clock) = create_test_reporter(ThrottlePolicy::default());
        reporter.begin(3).unwrap();
        reporter.report(OutcomeKind::Ok).unwrap();
        reporter.report(OutcomeKind::Empty).unwrap();
        reporter.report(OutcomeKind::Fail).unwrap();
        for _ in 0..finish_calls {
            reporter.finish().unwrap();
        }
        assert_eq!(reporter.run_state(), RunState::Finished);
        sink.contents()
    };

    let once = run(1);
    let twice = run(2);
    assert_eq!(once, twice);
    assert!(once.ends_with('\n'));
    assert_eq!(once.matches('\n').count(), 1);
}

#[test]
fn test_zero_total_renders_complete() {
    let (reporter, sink, _clock) = create_test_reporter(ThrottlePolicy::default());
    reporter.begin(0).unwrap();
    reporter.finish().unwrap();

    let line = sink.last_line().unwrap();
    assert!(line.contains("0/0"), "line was: {line}");
    assert!(line.contains("100.0%"), "line was: {line}");
    assert!(line.ends_with("0.0/s"), "line was: {line}");
    assert!(!line.contains('\u{2591}'), "bar should be full: {line}");
}

#[test]
fn test_large_run_is_throttled() {
    let (reporter, sink, _clock) = create_test_reporter(ThrottlePolicy::default());
    reporter.begin(10_000).unwrap();
    for i in 0..10_000 {
        let outcome = if i % 50 == 0 { OutcomeKind::Empty } else { OutcomeKind::Ok };
        reporter.report(outcome).unwrap();
    }
    reporter.finish().unwrap();

    let writes = sink.write_count();
    assert!(writes >= 50, "too few renders: {writes}");
    assert!(writes <= 200, "too many renders: {writes}");
}

#[test]
fn test_time_based_render_between_item_steps() {
    let throttle = ThrottlePolicy {
        every_items: Some(1_000),
        min_interval_ms: 500,
    };
    let (reporter, sink, clock) = create_test_reporter(throttle);
    reporter.begin(10_000).unwrap();
    let after_begin = sink.write_count();

    reporter.report(OutcomeKind::Ok).unwrap();
    assert_eq!(sink.write_count(), after_begin);

    clock.advance(Duration::from_millis(600));
    reporter.report(OutcomeKind::Ok).unwrap();
    assert_eq!(sink.write_count(), after_begin + 1);
}

#[test]
fn test_last_item_always_renders() {
    let (reporter, sink, _clock) = create_test_reporter(ThrottlePolicy::items_only(1_000));
    reporter.begin(5).unwrap();
    for _ in 0..5 {
        reporter.report(OutcomeKind::Ok).unwrap();
    }

    let line = sink.last_line().unwrap();
    assert!(line.contains("5/5"), "line was: {line}");
    assert!(!sink.contents().contains('\n'));
}

#[test]
fn test_renders_overwrite_in_place() {
    let (reporter, sink, _clock) = create_test_reporter(ThrottlePolicy::every_report());
    reporter.begin(4).unwrap();
    for _ in 0..4 {
        reporter.report(OutcomeKind::Ok).unwrap();
    }

    for frame in sink.frames() {
        assert!(frame.starts_with('\r'));
        assert!(!frame.contains('\n'));
    }
}

#[test]
fn test_shorter_line_pads_previous() {
    let (reporter, sink, clock) = create_test_reporter(ThrottlePolicy::every_report());
    reporter.begin(100).unwrap();
    clock.advance(Duration::from_millis(100));
    reporter.report(OutcomeKind::Ok).unwrap(); // 10.0/s
    clock.advance(Duration::from_secs(10));
    reporter.report(OutcomeKind::Ok).unwrap(); // 0.2/s

    let frames = sink.frames();
    let previous = &frames[frames.len() - 2];
    let latest = &frames[frames.len() - 1];
    assert_eq!(previous.chars().count(), latest.chars().count());
}

#[test]
fn test_lifecycle_errors() {
    let (reporter, _sink, _clock) = create_test_reporter(ThrottlePolicy::default());
    assert_eq!(reporter.run_state(), RunState::Uninitialized);

    assert!(matches!(
        reporter.report(OutcomeKind::Ok),
        Err(ProgressError::InvalidState { .. })
    ));
    assert!(matches!(reporter.finish(), Err(ProgressError::InvalidState { .. })));

    reporter.begin(1).unwrap();
    assert_eq!(reporter.run_state(), RunState::Running);
    assert!(matches!(reporter.begin(1), Err(ProgressError::InvalidState { .. })));

    reporter.report(OutcomeKind::Ok).unwrap();
    reporter.finish().unwrap();
    assert!(matches!(
        reporter.report(OutcomeKind::Ok),
        Err(ProgressError::InvalidState { .. })
    ));
}

#[test]
fn test_negative_total_is_invalid_argument() {
    let (reporter, sink, _clock) = create_test_reporter(ThrottlePolicy::default());

    let err = reporter.begin(-1i64).unwrap_err();
    assert!(matches!(err, ProgressError::InvalidArgument { .. }));
    assert_eq!(reporter.run_state(), RunState::Uninitialized);
    assert_eq!(sink.write_count(), 0);

    // A rejected begin() leaves the reporter usable
    reporter.begin(1usize).unwrap();
}

#[test]
fn test_broken_sink_does_not_disturb_caller() {
    let reporter = ProgressReporter::with_sink(
        ProgressConfig::default().with_throttle(ThrottlePolicy::every_report()),
        BrokenSink,
    );
    reporter.begin(3).unwrap();
    for _ in 0..3 {
        reporter.report(OutcomeKind::Ok).unwrap();
    }
    reporter.finish().unwrap();
    assert_eq!(reporter.snapshot().unwrap().completed, 3);
}

#[test]
fn test_disabled_reporter_tracks_without_writing() {
    let sink = MemorySink::new();
    let reporter = ProgressReporter::with_sink(ProgressConfig::default().with_enabled(false), sink.clone());
    reporter.begin(2).unwrap();
    reporter.report(OutcomeKind::Ok).unwrap();
    reporter.report(OutcomeKind::Fail).unwrap();
    reporter.finish().unwrap();

    assert_eq!(sink.write_count(), 0);
    assert_eq!(reporter.snapshot().unwrap().tallies.fail, 1);
}

#[test]
fn test_concurrent_reports_stay_consistent() {
    let sink = MemorySink::new();
    let reporter = Arc::new(ProgressReporter::with_sink(
        ProgressConfig::default().with_throttle(ThrottlePolicy::every_report()),
        sink.clone(),
    ));
    reporter.begin(800).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let reporter = reporter.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    reporter.report(OutcomeKind::ALL[worker % 3]).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    reporter.finish().unwrap();

    let snapshot = reporter.snapshot().unwrap();
    assert_eq!(snapshot.completed, 800);
    assert_eq!(snapshot.completed, snapshot.tallies.sum());

    // Each frame is one whole line; nothing was interleaved
    for frame in sink.frames() {
        assert_eq!(frame.matches('\r').count(), 1);
        assert!(frame.trim_end().ends_with("/s"));
    }
    assert!(sink.last_line().unwrap().contains("800/800"));
}
