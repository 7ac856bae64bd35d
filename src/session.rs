use crate::catalog::TargetKind;
use crate::location::Position;

/// What kind of round is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fixed insect, fixed clock, win at the pass threshold.
    Level(u8),
    /// Random insects, time bonus per catch, chase the record.
    Endless,
}

/// Live state of one round. Exists only while the controller is playing;
/// nothing carries across rounds except record writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub mode: Mode,
    pub score: u32,
    /// Seconds left. May dip below zero for the single dispatch that ends
    /// the session.
    pub time_remaining: i32,
    pub current_target: TargetKind,
    pub target_position: Position,
}

impl Session {
    pub fn is_endless(&self) -> bool {
        self.mode == Mode::Endless
    }
}

/// Observable outcomes of a controller operation, in emission order.
/// The shell renders these and plays its cues off them; the controller
/// never talks to the terminal directly.
#[derive(Debug, Clone, PartialEq)]
pub enum GameSignal {
    ScoreChanged(u32),
    TimeChanged(i32),
    TargetMoved(TargetKind, Position),
    LevelWon(u8),
    SessionEnded(u32),
    RecordUpdated(u32),
    PersistenceFailed(String),
}
