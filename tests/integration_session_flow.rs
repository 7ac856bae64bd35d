use assert_matches::assert_matches;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use skitter::catalog::{TargetCatalog, TargetKind};
use skitter::controller::{
    Phase, SessionController, ENDLESS_TIME_SECS, LEVEL_PASS_SCORE, LEVEL_TIME_SECS,
};
use skitter::location::PlayArea;
use skitter::records::{FileRecordStore, RecordState, RecordStore};
use skitter::scheduler::ManualScheduler;
use skitter::session::GameSignal;

fn new_game(
    dir: &TempDir,
    seed: u64,
) -> SessionController<StdRng, ManualScheduler> {
    SessionController::new(
        Box::new(FileRecordStore::with_path(dir.path().join("records.txt"))),
        TargetCatalog::default(),
        PlayArea::default(),
        StdRng::seed_from_u64(seed),
        ManualScheduler::new(),
    )
}

#[test]
fn every_level_starts_fresh_inside_bounds() {
    let dir = TempDir::new().unwrap();
    for level in 1..=3 {
        let mut game = new_game(&dir, level as u64);
        let signals = game.start_level(level);
        let session = game.session().expect("session exists while playing");
        assert_eq!(session.score, 0);
        assert_eq!(session.time_remaining, LEVEL_TIME_SECS);
        assert!(game.play_area().contains(session.target_position));
        assert_matches!(signals[0], GameSignal::ScoreChanged(0));
        assert_matches!(signals[1], GameSignal::TimeChanged(t) if t == LEVEL_TIME_SECS);
        assert_matches!(signals[2], GameSignal::TargetMoved(_, _));
        game.return_to_menu();
        assert!(game.session().is_none());
    }
}

#[test]
fn countdown_to_zero_emits_exactly_one_session_end() {
    let dir = TempDir::new().unwrap();
    let mut game = new_game(&dir, 5);
    game.start_endless();

    let mut ended = Vec::new();
    for _ in 0..ENDLESS_TIME_SECS {
        ended.extend(
            game.on_countdown_tick()
                .into_iter()
                .filter(|s| matches!(s, GameSignal::SessionEnded(_))),
        );
    }
    assert_eq!(ended, vec![GameSignal::SessionEnded(0)]);
    assert_eq!(game.phase(), Phase::Menu);

    // Further ticks are late deliveries and change nothing.
    assert!(game.on_countdown_tick().is_empty());
}

#[test]
fn winning_a_level_persists_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.txt");

    let mut game = new_game(&dir, 9);
    game.start_level(3);
    let mut wins = 0;
    for _ in 0..LEVEL_PASS_SCORE {
        for signal in game.on_target_clicked() {
            if matches!(signal, GameSignal::LevelWon(3)) {
                wins += 1;
            }
        }
    }
    assert_eq!(wins, 1);
    assert!(game.is_level_completed(3));
    assert!(FileRecordStore::with_path(&path).load().is_completed(3));

    // Complete it again; the stored set must not grow.
    game.start_level(3);
    for _ in 0..LEVEL_PASS_SCORE {
        game.on_target_clicked();
    }
    let reloaded = FileRecordStore::with_path(&path).load();
    assert_eq!(reloaded.completed_levels.len(), 1);
}

#[test]
fn endless_scoring_bonus_and_record_rules() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.txt");

    // Seed an existing best of 3.
    let store = FileRecordStore::with_path(&path);
    let mut seeded = RecordState::default();
    seeded.record_endless_score(3);
    store.save(&seeded).unwrap();

    let mut game = new_game(&dir, 11);
    game.start_endless();

    let mut expected_time = ENDLESS_TIME_SECS;
    for click in 1..=5u32 {
        let kind_before = game.session().unwrap().current_target;
        let bonus = game.catalog().get(kind_before).time_bonus_secs;
        expected_time += bonus;

        let signals = game.on_target_clicked();
        assert_matches!(signals[0], GameSignal::ScoreChanged(s) if s == click);
        assert_matches!(signals[1], GameSignal::TimeChanged(t) if t == expected_time);

        let session = game.session().unwrap();
        assert_eq!(session.score, click);
        assert_eq!(session.time_remaining, expected_time);

        let updated = signals
            .iter()
            .any(|s| matches!(s, GameSignal::RecordUpdated(_)));
        // Best starts at 3: clicks 1-3 must not touch the record, 4+ must.
        assert_eq!(updated, click > 3, "click {click}");
    }

    assert_eq!(game.best_endless_score(), 5);
    assert_eq!(FileRecordStore::with_path(&path).load().best_endless_score, 5);
}

#[test]
fn endless_timeout_is_a_plain_loss_when_no_record_was_set() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.txt");
    let store = FileRecordStore::with_path(&path);
    let mut seeded = RecordState::default();
    seeded.record_endless_score(100);
    store.save(&seeded).unwrap();

    let mut game = new_game(&dir, 13);
    game.start_endless();
    game.on_target_clicked();
    for _ in 0..100 {
        if !game.is_playing() {
            break;
        }
        game.on_countdown_tick();
    }
    assert_eq!(game.phase(), Phase::Menu);
    assert_eq!(FileRecordStore::with_path(&path).load().best_endless_score, 100);
}

#[test]
fn level_kind_is_fixed_endless_kind_is_not() {
    let dir = TempDir::new().unwrap();
    let mut game = new_game(&dir, 17);
    game.start_level(2);
    for _ in 0..30 {
        game.on_movement_tick();
        assert_eq!(game.session().unwrap().current_target, TargetKind::Mosquito);
    }
    game.return_to_menu();

    game.start_endless();
    let mut kinds = std::collections::HashSet::new();
    for _ in 0..60 {
        game.on_movement_tick();
        kinds.insert(game.session().unwrap().current_target);
    }
    assert!(kinds.len() > 1, "endless movement should re-kind the target");
}

#[test]
fn reset_followed_by_load_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.txt");

    let mut game = new_game(&dir, 19);
    game.start_endless();
    game.on_target_clicked();
    game.return_to_menu();
    game.start_level(1);
    for _ in 0..LEVEL_PASS_SCORE {
        game.on_target_clicked();
    }
    assert_ne!(FileRecordStore::with_path(&path).load(), RecordState::default());

    game.reset_all_records();
    assert_eq!(FileRecordStore::with_path(&path).load(), RecordState::default());
    assert_eq!(game.best_endless_score(), 0);
    assert!(!game.is_level_completed(1));
}

#[test]
fn corrupt_records_file_never_breaks_startup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.txt");
    std::fs::write(&path, "\u{0}\u{1}garbage\nmore garbage").unwrap();

    let game = new_game(&dir, 23);
    assert_eq!(game.best_endless_score(), 0);
    assert!(!game.is_level_completed(1));
    assert_eq!(game.phase(), Phase::Menu);
}
