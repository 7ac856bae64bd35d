mod ui;

use clap::Parser;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    collections::HashSet,
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

use skitter::catalog::TargetCatalog;
use skitter::config::FileConfigStore;
use skitter::controller::{Phase, SessionController, LEVEL_COUNT, LEVEL_PASS_SCORE};
use skitter::location::PlayArea;
use skitter::records::{self, FileRecordStore};
use skitter::runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner};
use skitter::scheduler::DeadlineScheduler;
use skitter::session::GameSignal;

const TICK_RATE_MS: u64 = 50;

/// catch-the-insect reaction game for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Catch the insect before the clock runs out. Three timed levels with \
increasingly fast insects, plus an endless mode where every catch buys you \
time and your best score is kept for good."
)]
pub struct Cli {}

/// Shell-side state: the game core plus what the terminal needs to render
/// around it.
pub struct App {
    pub controller: SessionController<StdRng, DeadlineScheduler>,
    /// One-line flash standing in for the original's sound cues.
    pub status: Option<String>,
    pub confirm_reset: bool,
    mode_label: Option<String>,
    asset_warned: HashSet<&'static str>,
}

impl App {
    pub fn new() -> Self {
        let config = FileConfigStore::new().load_or_create();
        let controller = SessionController::new(
            Box::new(FileRecordStore::new()),
            TargetCatalog::default(),
            PlayArea::new(config.play_width, config.play_height),
            StdRng::from_entropy(),
            DeadlineScheduler::new(),
        );
        Self::with_controller(controller)
    }

    fn with_controller(controller: SessionController<StdRng, DeadlineScheduler>) -> Self {
        Self {
            controller,
            status: None,
            confirm_reset: false,
            mode_label: None,
            asset_warned: HashSet::new(),
        }
    }

    /// Dispatches any due timers. Must run once per loop iteration, for
    /// every event kind: a stream of mouse-motion events arriving faster
    /// than the tick rate would otherwise starve the countdown.
    fn pump_timers(&mut self, now: Instant) {
        let signals = self.controller.advance(now);
        self.apply_signals(signals);
    }

    /// Handles one terminal event. Returns true when the app should quit.
    fn handle_event(&mut self, event: GameEvent, terminal_area: Rect) -> bool {
        match event {
            GameEvent::Tick | GameEvent::Resize => false,
            GameEvent::Mouse(mouse) => {
                if let MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                } = mouse
                {
                    self.click_at(terminal_area, column, row);
                }
                false
            }
            GameEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    return true;
                }

                if self.confirm_reset {
                    if key.code == KeyCode::Char('y') {
                        let signals = self.controller.reset_all_records();
                        self.apply_signals(signals);
                    }
                    self.confirm_reset = false;
                    return false;
                }

                match self.controller.phase() {
                    Phase::Menu => match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => return true,
                        KeyCode::Char(c @ '1'..='9') => {
                            let level = c as u8 - b'0';
                            if level <= LEVEL_COUNT {
                                self.start_level(level);
                            }
                        }
                        KeyCode::Char('e') => self.start_endless(),
                        KeyCode::Char('r') => self.confirm_reset = true,
                        _ => {}
                    },
                    _ => {
                        if key.code == KeyCode::Esc {
                            self.controller.return_to_menu();
                            self.status = None;
                            self.mode_label = None;
                        }
                    }
                }
                false
            }
        }
    }

    fn apply_signals(&mut self, signals: Vec<GameSignal>) {
        for signal in signals {
            match signal {
                GameSignal::LevelWon(level) => {
                    self.status = Some(format!("level {level} complete!"));
                    let _ = records::log_session(&format!("level{level}"), LEVEL_PASS_SCORE, "won");
                    self.mode_label = None;
                }
                GameSignal::SessionEnded(score) => {
                    self.status = Some(format!("time's up! final score: {score}"));
                    let mode = self.mode_label.take().unwrap_or_else(|| "unknown".into());
                    let _ = records::log_session(&mode, score, "lost");
                }
                GameSignal::RecordUpdated(best) if best > 0 => {
                    self.status = Some(format!("new record: {best}"));
                }
                GameSignal::RecordUpdated(_) => {
                    self.status = Some("progress reset".into());
                }
                GameSignal::PersistenceFailed(reason) => {
                    self.status = Some(format!("could not save records: {reason}"));
                }
                GameSignal::TargetMoved(kind, _) => {
                    let asset = self.controller.catalog().get(kind).asset;
                    if ui::resolve_sprite(asset).is_none() && self.asset_warned.insert(asset) {
                        self.status = Some(format!("missing sprite for {kind}, using placeholder"));
                    }
                }
                GameSignal::ScoreChanged(_) | GameSignal::TimeChanged(_) => {}
            }
        }
    }

    fn start_level(&mut self, level: u8) {
        self.status = None;
        self.asset_warned.clear();
        self.mode_label = Some(format!("level{level}"));
        let signals = self.controller.start_level(level);
        self.apply_signals(signals);
    }

    fn start_endless(&mut self) {
        self.status = None;
        self.asset_warned.clear();
        self.mode_label = Some("endless".into());
        let signals = self.controller.start_endless();
        self.apply_signals(signals);
    }

    fn click_at(&mut self, terminal_area: Rect, column: u16, row: u16) {
        let Some(session) = self.controller.session() else {
            return;
        };
        let (_, field) = ui::layout(terminal_area);
        let rect = ui::target_rect(field, self.controller.play_area(), session.target_position);
        let hit = column >= rect.x
            && column < rect.x + rect.width
            && row >= rect.y
            && row < rect.y + rect.height;
        if hit {
            let signals = self.controller.on_target_clicked();
            self.apply_signals(signals);
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let _cli = Cli::parse();

    if !stdin().is_tty() {
        return Err("stdin must be a tty".into());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let ticker = FixedTicker::new(Duration::from_millis(TICK_RATE_MS));
    let runner = Runner::new(events, ticker);

    loop {
        terminal.draw(|f| ui(app, f))?;

        let event = runner.step();
        let size = terminal.size()?;
        let quit = app.handle_event(event, Rect::new(0, 0, size.width, size.height));
        // Timers are pumped on every iteration, never only on Tick.
        app.pump_timers(Instant::now());
        if quit {
            break;
        }
    }

    Ok(())
}
