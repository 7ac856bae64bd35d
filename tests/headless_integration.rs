use std::sync::mpsc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use skitter::catalog::TargetCatalog;
use skitter::controller::{Phase, SessionController, LEVEL_TIME_SECS};
use skitter::location::PlayArea;
use skitter::records::FileRecordStore;
use skitter::runtime::{FixedTicker, GameEvent, Runner, TestEventSource};
use skitter::scheduler::DeadlineScheduler;
use skitter::session::GameSignal;

// Headless integration using the internal runtime + controller without a
// TTY. Verifies a full level round lost to the clock, driven through
// Runner/TestEventSource with simulated time.
#[test]
fn headless_level_round_times_out() {
    let dir = TempDir::new().unwrap();
    let mut game = SessionController::new(
        Box::new(FileRecordStore::with_path(dir.path().join("records.txt"))),
        TargetCatalog::default(),
        PlayArea::default(),
        StdRng::seed_from_u64(1),
        DeadlineScheduler::new(),
    );

    let (_tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(1));
    let runner = Runner::new(es, ticker);

    game.start_level(1);
    let start = Instant::now();
    let mut simulated = 0u64;
    let mut ended = 0;

    // Each runner tick advances simulated time by one second.
    for _ in 0..(LEVEL_TIME_SECS as u64 + 5) {
        if let GameEvent::Tick = runner.step() {
            simulated += 1;
            let now = start + Duration::from_secs(simulated);
            for signal in game.advance(now) {
                if matches!(signal, GameSignal::SessionEnded(_)) {
                    ended += 1;
                }
            }
        }
        if !game.is_playing() {
            break;
        }
    }

    assert_eq!(ended, 1, "exactly one session end");
    assert_eq!(game.phase(), Phase::Menu);
    assert!(game.session().is_none());
    assert!(!game.is_level_completed(1), "a timeout is not a completion");
}

// Movement timers keep relocating the target between countdown ticks.
#[test]
fn headless_movement_relocates_between_seconds() {
    let dir = TempDir::new().unwrap();
    let mut game = SessionController::new(
        Box::new(FileRecordStore::with_path(dir.path().join("records.txt"))),
        TargetCatalog::default(),
        PlayArea::default(),
        StdRng::seed_from_u64(2),
        DeadlineScheduler::new(),
    );

    // Level 3 is the fly: 600 ms movement interval.
    game.start_level(3);
    let first = game.session().unwrap().target_position;

    let start = Instant::now();
    let signals = game.advance(start + Duration::from_millis(700));
    assert!(signals
        .iter()
        .any(|s| matches!(s, GameSignal::TargetMoved(_, _))));
    let second = game.session().unwrap().target_position;
    assert_ne!(first, second);
    assert!(game.play_area().contains(second));

    // 700 ms in, the countdown has not fired yet.
    assert_eq!(game.session().unwrap().time_remaining, LEVEL_TIME_SECS);
}

// A late movement tick delivered after returning to the menu is dropped.
#[test]
fn headless_late_tick_after_menu_return_is_ignored() {
    let dir = TempDir::new().unwrap();
    let mut game = SessionController::new(
        Box::new(FileRecordStore::with_path(dir.path().join("records.txt"))),
        TargetCatalog::default(),
        PlayArea::default(),
        StdRng::seed_from_u64(3),
        DeadlineScheduler::new(),
    );

    game.start_endless();
    game.return_to_menu();

    // Both schedules were cancelled, so nothing is due no matter how far
    // time advances; direct tick delivery is a no-op as well.
    let signals = game.advance(Instant::now() + Duration::from_secs(60));
    assert!(signals.is_empty());
    assert!(game.on_movement_tick().is_empty());
    assert_eq!(game.phase(), Phase::Menu);
}
