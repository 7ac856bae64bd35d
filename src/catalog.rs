use rand::Rng;

/// The three insects the player can be asked to catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TargetKind {
    Cockroach,
    Mosquito,
    Fly,
}

impl TargetKind {
    pub const ALL: [TargetKind; 3] = [TargetKind::Cockroach, TargetKind::Mosquito, TargetKind::Fly];

    /// The insect bound to a level. Level 1 is the slow one.
    pub fn for_level(level: u8) -> TargetKind {
        match level {
            1 => TargetKind::Cockroach,
            2 => TargetKind::Mosquito,
            _ => TargetKind::Fly,
        }
    }

    /// Endless-mode draw: 40% cockroach, 40% mosquito, 20% fly,
    /// independent of history.
    pub fn random<R: Rng>(rng: &mut R) -> TargetKind {
        let roll = rng.gen_range(0..100);
        if roll < 40 {
            TargetKind::Cockroach
        } else if roll < 80 {
            TargetKind::Mosquito
        } else {
            TargetKind::Fly
        }
    }
}

/// Per-kind tuning. `asset` is an opaque sprite name resolved by the shell;
/// a name the shell cannot resolve must not affect game logic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSpec {
    pub movement_interval_ms: u64,
    pub time_bonus_secs: i32,
    pub asset: &'static str,
}

/// Read-only table of target tuning, fixed after construction.
#[derive(Debug, Clone, Copy)]
pub struct TargetCatalog {
    cockroach: TargetSpec,
    mosquito: TargetSpec,
    fly: TargetSpec,
}

impl TargetCatalog {
    pub fn get(&self, kind: TargetKind) -> &TargetSpec {
        match kind {
            TargetKind::Cockroach => &self.cockroach,
            TargetKind::Mosquito => &self.mosquito,
            TargetKind::Fly => &self.fly,
        }
    }
}

impl Default for TargetCatalog {
    fn default() -> Self {
        Self {
            cockroach: TargetSpec {
                movement_interval_ms: 1600,
                time_bonus_secs: 1,
                asset: "cockroach",
            },
            mosquito: TargetSpec {
                movement_interval_ms: 800,
                time_bonus_secs: 2,
                asset: "mosquito",
            },
            fly: TargetSpec {
                movement_interval_ms: 600,
                time_bonus_secs: 3,
                asset: "fly",
            },
        }
    }
}
