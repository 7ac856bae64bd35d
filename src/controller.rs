use crate::catalog::{TargetCatalog, TargetKind};
use crate::location::{LocationPicker, PlayArea};
use crate::records::{RecordState, RecordStore};
use crate::scheduler::{Scheduler, TimerEvent, TimerHandle};
use crate::session::{GameSignal, Mode, Session};
use rand::Rng;
use std::time::{Duration, Instant};

pub const LEVEL_COUNT: u8 = 3;
pub const LEVEL_TIME_SECS: i32 = 20;
pub const ENDLESS_TIME_SECS: i32 = 15;
pub const LEVEL_PASS_SCORE: u32 = 10;
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Where the state machine currently rests. Win/Lose outcomes are emitted
/// as signals and collapse straight back to `Menu`, so they never appear
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    LevelPlaying(u8),
    EndlessPlaying,
}

/// Owns the session lifecycle: menu, level play, endless play, scoring,
/// record updates and the two periodic schedules (countdown + movement).
///
/// Every operation returns the signals it produced, in order, for the
/// shell to render. Timer events arriving after a session has been torn
/// down are no-ops.
pub struct SessionController<R: Rng, S: Scheduler> {
    phase: Phase,
    session: Option<Session>,
    records: RecordState,
    store: Box<dyn RecordStore>,
    catalog: TargetCatalog,
    area: PlayArea,
    picker: LocationPicker,
    rng: R,
    scheduler: S,
    countdown: Option<TimerHandle>,
    movement: Option<TimerHandle>,
}

impl<R: Rng, S: Scheduler> SessionController<R, S> {
    pub fn new(
        store: Box<dyn RecordStore>,
        catalog: TargetCatalog,
        area: PlayArea,
        rng: R,
        scheduler: S,
    ) -> Self {
        let records = store.load();
        Self {
            phase: Phase::Menu,
            session: None,
            records,
            store,
            catalog,
            area,
            picker: LocationPicker::new(),
            rng,
            scheduler,
            countdown: None,
            movement: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.phase != Phase::Menu
    }

    pub fn catalog(&self) -> &TargetCatalog {
        &self.catalog
    }

    pub fn play_area(&self) -> &PlayArea {
        &self.area
    }

    pub fn best_endless_score(&self) -> u32 {
        self.records.best_endless_score
    }

    pub fn is_level_completed(&self, level: u8) -> bool {
        self.records.is_completed(level)
    }

    /// Dispatch all timer events due at `now` into the state machine.
    pub fn advance(&mut self, now: Instant) -> Vec<GameSignal> {
        let mut signals = Vec::new();
        for event in self.scheduler.poll_due(now) {
            match event {
                TimerEvent::Countdown => signals.extend(self.on_countdown_tick()),
                TimerEvent::Movement => signals.extend(self.on_movement_tick()),
            }
        }
        signals
    }

    pub fn start_level(&mut self, level: u8) -> Vec<GameSignal> {
        debug_assert!(self.phase == Phase::Menu, "start_level with a session active");
        debug_assert!((1..=LEVEL_COUNT).contains(&level), "unknown level id");
        if self.phase != Phase::Menu || !(1..=LEVEL_COUNT).contains(&level) {
            return Vec::new();
        }

        self.picker.clear();
        let kind = TargetKind::for_level(level);
        let pos = self.picker.pick(&self.area, &mut self.rng);
        self.session = Some(Session {
            mode: Mode::Level(level),
            score: 0,
            time_remaining: LEVEL_TIME_SECS,
            current_target: kind,
            target_position: pos,
        });
        self.phase = Phase::LevelPlaying(level);
        self.arm_schedules(kind);

        vec![
            GameSignal::ScoreChanged(0),
            GameSignal::TimeChanged(LEVEL_TIME_SECS),
            GameSignal::TargetMoved(kind, pos),
        ]
    }

    pub fn start_endless(&mut self) -> Vec<GameSignal> {
        debug_assert!(self.phase == Phase::Menu, "start_endless with a session active");
        if self.phase != Phase::Menu {
            return Vec::new();
        }

        self.picker.clear();
        // One randomize before the first tick, so the round never opens on
        // a stale kind.
        let kind = TargetKind::random(&mut self.rng);
        let pos = self.picker.pick(&self.area, &mut self.rng);
        self.session = Some(Session {
            mode: Mode::Endless,
            score: 0,
            time_remaining: ENDLESS_TIME_SECS,
            current_target: kind,
            target_position: pos,
        });
        self.phase = Phase::EndlessPlaying;
        self.arm_schedules(kind);

        vec![
            GameSignal::ScoreChanged(0),
            GameSignal::TimeChanged(ENDLESS_TIME_SECS),
            GameSignal::TargetMoved(kind, pos),
        ]
    }

    pub fn on_countdown_tick(&mut self) -> Vec<GameSignal> {
        let mut signals = Vec::new();
        let Some(session) = self.session.as_mut() else {
            // Late tick against a torn-down session.
            return signals;
        };

        session.time_remaining -= 1;
        signals.push(GameSignal::TimeChanged(session.time_remaining));

        if session.time_remaining <= 0 {
            let score = session.score;
            let endless = session.is_endless();
            self.stop_schedules();
            if endless && self.records.record_endless_score(score) {
                signals.push(GameSignal::RecordUpdated(score));
                if let Err(err) = self.store.save(&self.records) {
                    signals.push(GameSignal::PersistenceFailed(err.to_string()));
                }
            }
            signals.push(GameSignal::SessionEnded(score));
            self.session = None;
            self.phase = Phase::Menu;
        }
        signals
    }

    pub fn on_movement_tick(&mut self) -> Vec<GameSignal> {
        let mut signals = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return signals;
        };

        // Movement and kind randomize are coupled in endless mode only;
        // level play keeps its fixed insect.
        if session.is_endless() {
            let kind = TargetKind::random(&mut self.rng);
            session.current_target = kind;
            let interval = Duration::from_millis(self.catalog.get(kind).movement_interval_ms);
            if let Some(handle) = self.movement {
                self.scheduler.reschedule(handle, interval);
            }
        }

        let pos = self.picker.pick(&self.area, &mut self.rng);
        session.target_position = pos;
        signals.push(GameSignal::TargetMoved(session.current_target, pos));
        signals
    }

    pub fn on_target_clicked(&mut self) -> Vec<GameSignal> {
        let mut signals = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return signals;
        };

        session.score += 1;
        signals.push(GameSignal::ScoreChanged(session.score));

        match session.mode {
            Mode::Endless => {
                let bonus = self.catalog.get(session.current_target).time_bonus_secs;
                session.time_remaining += bonus;
                signals.push(GameSignal::TimeChanged(session.time_remaining));

                // The record write lands before the target re-randomizes.
                let score = session.score;
                if self.records.record_endless_score(score) {
                    signals.push(GameSignal::RecordUpdated(score));
                    if let Err(err) = self.store.save(&self.records) {
                        signals.push(GameSignal::PersistenceFailed(err.to_string()));
                    }
                }

                let kind = TargetKind::random(&mut self.rng);
                let pos = self.picker.pick(&self.area, &mut self.rng);
                session.current_target = kind;
                session.target_position = pos;
                let interval = Duration::from_millis(self.catalog.get(kind).movement_interval_ms);
                if let Some(handle) = self.movement {
                    self.scheduler.reschedule(handle, interval);
                }
                signals.push(GameSignal::TargetMoved(kind, pos));
            }
            Mode::Level(level) if session.score >= LEVEL_PASS_SCORE => {
                self.stop_schedules();
                if self.records.record_level_completion(level) {
                    if let Err(err) = self.store.save(&self.records) {
                        signals.push(GameSignal::PersistenceFailed(err.to_string()));
                    }
                }
                signals.push(GameSignal::LevelWon(level));
                self.session = None;
                self.phase = Phase::Menu;
            }
            Mode::Level(_) => {
                let kind = session.current_target;
                let pos = self.picker.pick(&self.area, &mut self.rng);
                session.target_position = pos;
                signals.push(GameSignal::TargetMoved(kind, pos));
            }
        }
        signals
    }

    /// Valid from any state. Stops both schedules and discards the
    /// session.
    pub fn return_to_menu(&mut self) {
        self.stop_schedules();
        self.session = None;
        self.phase = Phase::Menu;
    }

    pub fn reset_all_records(&mut self) -> Vec<GameSignal> {
        self.records.reset();
        let mut signals = vec![GameSignal::RecordUpdated(0)];
        if let Err(err) = self.store.save(&self.records) {
            signals.push(GameSignal::PersistenceFailed(err.to_string()));
        }
        signals
    }

    fn arm_schedules(&mut self, kind: TargetKind) {
        self.countdown = Some(
            self.scheduler
                .schedule_periodic(COUNTDOWN_INTERVAL, TimerEvent::Countdown),
        );
        let interval = Duration::from_millis(self.catalog.get(kind).movement_interval_ms);
        self.movement = Some(self.scheduler.schedule_periodic(interval, TimerEvent::Movement));
    }

    fn stop_schedules(&mut self) {
        if let Some(handle) = self.countdown.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.movement.take() {
            self.scheduler.cancel(handle);
        }
    }
}
