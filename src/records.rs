use crate::app_dirs::AppDirs;
use chrono::prelude::*;
use itertools::Itertools;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Persisted progress: best endless score plus the set of completed
/// levels. Mutators return whether anything changed so callers only hit
/// the store when there is something new to write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordState {
    pub best_endless_score: u32,
    pub completed_levels: HashSet<u8>,
}

impl RecordState {
    pub fn record_endless_score(&mut self, score: u32) -> bool {
        if score > self.best_endless_score {
            self.best_endless_score = score;
            true
        } else {
            false
        }
    }

    pub fn record_level_completion(&mut self, level: u8) -> bool {
        self.completed_levels.insert(level)
    }

    pub fn is_completed(&self, level: u8) -> bool {
        self.completed_levels.contains(&level)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub trait RecordStore {
    /// Load never fails visibly: a missing or corrupt file yields the
    /// defaults so startup cannot crash on bad data.
    fn load(&self) -> RecordState;
    fn save(&self, records: &RecordState) -> io::Result<()>;
}

/// Plain-text record file: line 0 is the best endless score, every
/// following line one completed level id. Malformed lines are skipped.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::records_path().unwrap_or_else(|| PathBuf::from("skitter_records.txt"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self) -> RecordState {
        let mut records = RecordState::default();
        if let Ok(contents) = fs::read_to_string(&self.path) {
            let mut lines = contents.lines();
            if let Some(first) = lines.next() {
                if let Ok(best) = first.trim().parse::<u32>() {
                    records.best_endless_score = best;
                }
            }
            for line in lines {
                if let Ok(level) = line.trim().parse::<u8>() {
                    records.completed_levels.insert(level);
                }
            }
        }
        records
    }

    fn save(&self, records: &RecordState) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut body = records.best_endless_score.to_string();
        for level in records.completed_levels.iter().sorted() {
            body.push('\n');
            body.push_str(&level.to_string());
        }
        body.push('\n');
        fs::write(&self.path, body)
    }
}

/// Appends one line per finished round to the session log, emitting a
/// header the first time. Best effort; callers ignore failures.
pub fn log_session(mode: &str, score: u32, outcome: &str) -> io::Result<()> {
    if let Some(log_path) = AppDirs::session_log_path() {
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let needs_header = !log_path.exists();

        let mut log_file = OpenOptions::new()
            .write(true)
            .append(true)
            .create(true)
            .open(log_path)?;

        if needs_header {
            writeln!(log_file, "date,mode,score,outcome")?;
        }

        writeln!(log_file, "{},{},{},{}", Local::now().format("%c"), mode, score, outcome)?;
    }

    Ok(())
}
