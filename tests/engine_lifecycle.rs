mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{trigger, wait_for_event, wait_until, Probe};
use pendulum::{
    ConfigError, EngineConfig, EngineEvent, EngineState, ManualClock, Metronome,
    MetronomeError, MisuseError, TempoConfig,
};

fn manual_engine(config: EngineConfig) -> (Metronome<common::RecordingSink, ManualClock>, Arc<Probe>) {
    let probe = Arc::new(Probe::default());
    let metronome = Metronome::with_clock(config, trigger(&probe), ManualClock::new()).unwrap();
    (metronome, probe)
}

fn tempo_120() -> EngineConfig {
    EngineConfig::new(TempoConfig::new(120.0, 4).unwrap())
}

#[test]
fn plays_regular_then_accent_at_120_bpm() {
    let (mut metronome, probe) = manual_engine(tempo_120());
    let mut seen = Vec::new();

    metronome.start().unwrap();
    assert_eq!(metronome.state(), EngineState::Running);
    assert!(wait_for_event(&mut metronome, &mut seen, |e| *e == EngineEvent::Started));

    // beat 0 is silent by default
    thread::sleep(Duration::from_millis(40));
    assert!(probe.clicks().is_empty());

    metronome.clock().set(Duration::from_millis(500));
    assert!(wait_for_event(&mut metronome, &mut seen, |e| matches!(
        e,
        EngineEvent::Beat { index: 1, .. }
    )));

    // a stall over beats 2 and 3 still gives a single click, on the accent
    metronome.clock().set(Duration::from_secs(2));
    assert!(wait_for_event(&mut metronome, &mut seen, |e| matches!(
        e,
        EngineEvent::Beat { index: 4, .. }
    )));

    let beats: Vec<_> = seen
        .iter()
        .filter(|e| matches!(e, EngineEvent::Beat { .. }))
        .cloned()
        .collect();
    assert_eq!(
        beats,
        vec![
            EngineEvent::Beat {
                index: 1,
                accent: false,
                skipped: 0,
            },
            EngineEvent::Beat {
                index: 4,
                accent: true,
                skipped: 2,
            },
        ]
    );
    assert_eq!(probe.clicks(), vec![false, true]);

    metronome.stop().unwrap();
    assert_eq!(metronome.state(), EngineState::Idle);
    assert_eq!(metronome.angle(), 0.0);
    assert!(metronome
        .drain_events()
        .iter()
        .any(|e| *e == EngineEvent::Stopped));
}

#[test]
fn needle_follows_the_beat_phase() {
    let (mut metronome, _probe) = manual_engine(tempo_120());
    let needle = metronome.needle();

    metronome.start().unwrap();
    assert!(wait_until(Duration::from_secs(2), || {
        (needle.angle() - 35.0).abs() < 1e-3
    }));

    // half-way through beat 1
    metronome.clock().set(Duration::from_millis(750));
    assert!(wait_until(Duration::from_secs(2), || needle.angle().abs() < 1e-3));

    // start of beat 1 swings the other way
    metronome.clock().set(Duration::from_millis(500));
    // the clock went backwards; the tracker stays on beat 1 and the needle
    // reflects the phase it is given
    assert!(wait_until(Duration::from_secs(2), || {
        (needle.angle() + 35.0).abs() < 1e-3
    }));

    metronome.stop().unwrap();
    assert_eq!(needle.angle(), 0.0);
    assert_eq!(needle.state(), EngineState::Idle);
}

#[test]
fn click_on_start_sounds_the_downbeat() {
    let (mut metronome, probe) = manual_engine(tempo_120().click_on_start(true));
    let mut seen = Vec::new();

    metronome.start().unwrap();
    assert!(wait_for_event(&mut metronome, &mut seen, |e| matches!(
        e,
        EngineEvent::Beat {
            index: 0,
            accent: true,
            skipped: 0,
        }
    )));
    metronome.stop().unwrap();
    assert_eq!(probe.clicks(), vec![true]);
}

#[test]
fn stop_while_idle_is_a_no_op() {
    let (mut metronome, probe) = manual_engine(tempo_120());

    metronome.stop().unwrap();
    metronome.stop().unwrap();
    assert_eq!(metronome.state(), EngineState::Idle);
    assert!(metronome.drain_events().is_empty());
    assert_eq!(probe.dropped.load(Ordering::SeqCst), 0);
}

#[test]
fn second_start_is_rejected() {
    let (mut metronome, _probe) = manual_engine(tempo_120());

    metronome.start().unwrap();
    let err = metronome.start().unwrap_err();
    assert!(matches!(
        err,
        MetronomeError::Misuse(MisuseError::AlreadyRunning)
    ));
    assert_eq!(metronome.state(), EngineState::Running);

    metronome.stop().unwrap();
    metronome.start().unwrap();
    metronome.stop().unwrap();
}

#[test]
fn invalid_tempo_fails_at_start_and_leaves_engine_idle() {
    let (mut metronome, _probe) = manual_engine(tempo_120());

    metronome
        .set_tempo(TempoConfig {
            bpm: 0.0,
            beats_per_bar: 4,
        })
        .unwrap();
    let err = metronome.start().unwrap_err();
    assert!(matches!(
        err,
        MetronomeError::Configuration(ConfigError::InvalidTempo(_))
    ));
    assert_eq!(metronome.state(), EngineState::Idle);

    metronome
        .set_tempo(TempoConfig {
            bpm: 90.0,
            beats_per_bar: 0,
        })
        .unwrap();
    assert!(matches!(
        metronome.start(),
        Err(MetronomeError::Configuration(ConfigError::ZeroBeatsPerBar))
    ));

    metronome.set_tempo(TempoConfig::new(90.0, 3).unwrap()).unwrap();
    metronome.start().unwrap();
    metronome.stop().unwrap();
}

#[test]
fn untimeable_tempo_is_rejected_at_start_not_in_the_loop() {
    let (mut metronome, _probe) = manual_engine(tempo_120());

    metronome
        .set_tempo(TempoConfig {
            bpm: 1e-20,
            beats_per_bar: 4,
        })
        .unwrap();
    assert!(matches!(
        metronome.start(),
        Err(MetronomeError::Configuration(ConfigError::InvalidTempo(_)))
    ));
    assert_eq!(metronome.state(), EngineState::Idle);
    assert!(metronome.take_fault().is_none());
}

#[test]
fn very_fast_tempo_runs_without_faulting() {
    let (mut metronome, probe) = manual_engine(tempo_120());
    metronome
        .set_tempo(TempoConfig::new(1e12, 4).unwrap())
        .unwrap();

    metronome.start().unwrap();
    metronome.clock().advance(Duration::from_millis(5));
    let mut seen = Vec::new();
    assert!(wait_for_event(&mut metronome, &mut seen, |e| matches!(
        e,
        EngineEvent::Beat { .. }
    )));
    metronome.stop().unwrap();

    assert!(metronome.take_fault().is_none());
    assert!(!probe.clicks().is_empty());
}

#[test]
fn construction_rejects_invalid_config() {
    let probe = Arc::new(Probe::default());
    let bad = EngineConfig::new(TempoConfig {
        bpm: -10.0,
        beats_per_bar: 4,
    });
    let err = Metronome::with_clock(bad, trigger(&probe), ManualClock::new()).unwrap_err();
    assert!(matches!(err, MetronomeError::Configuration(_)));
}

#[test]
fn tempo_cannot_change_mid_run() {
    let (mut metronome, _probe) = manual_engine(tempo_120());

    metronome.start().unwrap();
    let err = metronome
        .set_tempo(TempoConfig::new(60.0, 4).unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        MetronomeError::Misuse(MisuseError::RetuneWhileRunning)
    ));
    assert_eq!(metronome.config().tempo.bpm, 120.0);

    metronome.stop().unwrap();
    metronome
        .set_tempo(TempoConfig::new(60.0, 4).unwrap())
        .unwrap();
    assert_eq!(metronome.config().tempo.bpm, 60.0);
}

#[test]
fn failed_clicks_do_not_stop_the_loop() {
    let (mut metronome, probe) = manual_engine(tempo_120());
    let mut seen = Vec::new();
    probe.fail_writes.store(true, Ordering::SeqCst);

    metronome.start().unwrap();
    metronome.clock().set(Duration::from_millis(500));
    assert!(wait_for_event(&mut metronome, &mut seen, |e| matches!(
        e,
        EngineEvent::ClickDropped { index: 1, .. }
    )));
    assert_eq!(metronome.state(), EngineState::Running);

    probe.fail_writes.store(false, Ordering::SeqCst);
    metronome.clock().set(Duration::from_millis(1_000));
    assert!(wait_for_event(&mut metronome, &mut seen, |e| matches!(
        e,
        EngineEvent::Beat { index: 2, .. }
    )));

    metronome.stop().unwrap();
    assert_eq!(probe.clicks(), vec![false]);
    assert!(metronome.take_fault().is_none());
}

#[test]
fn loop_fault_returns_engine_to_idle_and_is_reported() {
    let (mut metronome, probe) = manual_engine(tempo_120());
    let mut seen = Vec::new();
    probe.panic_on_write.store(true, Ordering::SeqCst);

    metronome.start().unwrap();
    metronome.clock().set(Duration::from_millis(500));
    assert!(wait_for_event(&mut metronome, &mut seen, |e| matches!(
        e,
        EngineEvent::Fault(_)
    )));
    assert!(wait_until(Duration::from_secs(2), || {
        metronome.state() == EngineState::Idle
    }));
    assert_eq!(metronome.angle(), 0.0);

    let fault = metronome.take_fault();
    assert!(matches!(fault, Some(MetronomeError::LoopFault(ref msg)) if msg.contains("sink exploded")));
    assert!(metronome.take_fault().is_none());

    // the trigger came back with the worker; the engine is usable again
    probe.panic_on_write.store(false, Ordering::SeqCst);
    metronome.clock().set(Duration::ZERO);
    metronome.start().unwrap();
    metronome.stop().unwrap();
    assert_eq!(probe.dropped.load(Ordering::SeqCst), 0);
}

#[test]
fn stop_interrupts_a_long_polling_interval() {
    // 1 bpm with 2 polls per beat: 30 s between polls
    let config = EngineConfig::new(TempoConfig::new(1.0, 4).unwrap()).polls_per_beat(2);
    let (mut metronome, _probe) = manual_engine(config);

    metronome.start().unwrap();
    thread::sleep(Duration::from_millis(20));

    let started = Instant::now();
    metronome.stop().unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(metronome.state(), EngineState::Idle);
}

#[test]
fn rapid_start_stop_never_overlaps_loops() {
    let probe = Arc::new(Probe::default());
    let config = EngineConfig::new(TempoConfig::new(240.0, 4).unwrap()).click_on_start(true);
    let mut metronome = Metronome::new(config, trigger(&probe)).unwrap();
    let needle = metronome.needle();

    for _ in 0..1_000 {
        metronome.start().unwrap();
        metronome.stop().unwrap();
        assert_eq!(needle.state(), EngineState::Idle);
        assert_eq!(needle.angle(), 0.0);
    }

    assert!(probe.max_in_flight.load(Ordering::SeqCst) <= 1);
    assert_eq!(probe.created.load(Ordering::SeqCst), 1);
    assert_eq!(probe.dropped.load(Ordering::SeqCst), 0);

    metronome.shutdown().unwrap();
    assert_eq!(probe.dropped.load(Ordering::SeqCst), 1);
}

#[test]
fn shutdown_is_rejected_while_running_and_only_once() {
    let (mut metronome, probe) = manual_engine(tempo_120());

    metronome.start().unwrap();
    assert!(matches!(
        metronome.shutdown(),
        Err(MetronomeError::Misuse(MisuseError::ShutdownWhileRunning))
    ));
    assert_eq!(metronome.state(), EngineState::Running);
    assert_eq!(probe.dropped.load(Ordering::SeqCst), 0);

    metronome.stop().unwrap();
    metronome.shutdown().unwrap();
    assert!(metronome.is_shut_down());
    assert_eq!(probe.dropped.load(Ordering::SeqCst), 1);

    assert!(matches!(metronome.shutdown(), Err(MetronomeError::ShutDown)));
    assert!(matches!(metronome.start(), Err(MetronomeError::ShutDown)));
    metronome.stop().unwrap();
}

#[test]
fn shutdown_without_ever_starting_releases_output() {
    let (mut metronome, probe) = manual_engine(tempo_120());
    metronome.shutdown().unwrap();
    assert_eq!(probe.dropped.load(Ordering::SeqCst), 1);
}

#[test]
fn dropping_a_running_engine_releases_output() {
    let (mut metronome, probe) = manual_engine(tempo_120());
    metronome.start().unwrap();
    drop(metronome);
    assert_eq!(probe.dropped.load(Ordering::SeqCst), 1);
}

#[test]
fn needle_can_be_polled_from_another_thread() {
    let config = EngineConfig::new(TempoConfig::new(300.0, 4).unwrap());
    let probe = Arc::new(Probe::default());
    let mut metronome = Metronome::new(config, trigger(&probe)).unwrap();
    let needle = metronome.needle();

    metronome.start().unwrap();
    let reader = thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_millis(300);
        let mut samples = Vec::new();
        while Instant::now() < deadline {
            samples.push(needle.angle());
            thread::sleep(Duration::from_millis(1));
        }
        samples
    });

    let samples = reader.join().unwrap();
    metronome.stop().unwrap();

    assert!(samples.iter().all(|a| a.abs() <= 35.0 + 1e-3));
    assert!(samples.iter().any(|a| *a > 1.0));
    assert!(samples.iter().any(|a| *a < -1.0));
}
