use rand::Rng;
use std::collections::VecDeque;

/// Positions the picker refuses to repeat before giving up.
pub const MAX_PICK_ATTEMPTS: u32 = 100;
/// How many recent positions are remembered.
pub const HISTORY_CAP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

/// Logical play area in the original's 800x600 coordinate space. The
/// margins keep the target fully visible and clear of the HUD; the right
/// and bottom margins include the 50-unit target footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: u32,
    pub height: u32,
    pub margin_left: u32,
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
}

impl PlayArea {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            margin_left: 20,
            margin_top: 70,
            margin_right: 70,
            margin_bottom: 70,
        }
    }

    /// Half-open x range a target may occupy.
    pub fn x_range(&self) -> std::ops::Range<u32> {
        self.margin_left..self.width.saturating_sub(self.margin_right).max(self.margin_left + 1)
    }

    /// Half-open y range a target may occupy.
    pub fn y_range(&self) -> std::ops::Range<u32> {
        self.margin_top..self.height.saturating_sub(self.margin_bottom).max(self.margin_top + 1)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.x_range().contains(&pos.x) && self.y_range().contains(&pos.y)
    }
}

impl Default for PlayArea {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Produces non-repeating random positions inside a play area.
///
/// The picker remembers the last [`HISTORY_CAP`] positions and retries up
/// to [`MAX_PICK_ATTEMPTS`] times to avoid them. If retries run out it
/// clears the history and returns the last candidate without recording
/// it, trading a possible repeat for a guaranteed exit.
#[derive(Debug, Default)]
pub struct LocationPicker {
    history: VecDeque<Position>,
}

impl LocationPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn recent(&self) -> impl Iterator<Item = &Position> {
        self.history.iter()
    }

    pub fn pick<R: Rng>(&mut self, area: &PlayArea, rng: &mut R) -> Position {
        let mut candidate = Self::any(area, rng);
        let mut attempts = 1;
        while self.history.contains(&candidate) {
            if attempts >= MAX_PICK_ATTEMPTS {
                self.history.clear();
                return candidate;
            }
            candidate = Self::any(area, rng);
            attempts += 1;
        }

        self.history.push_back(candidate);
        if self.history.len() > HISTORY_CAP {
            self.history.pop_front();
        }
        candidate
    }

    fn any<R: Rng>(area: &PlayArea, rng: &mut R) -> Position {
        Position {
            x: rng.gen_range(area.x_range()),
            y: rng.gen_range(area.y_range()),
        }
    }
}
