use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::App;
use skitter::controller::{Phase, LEVEL_COUNT, LEVEL_PASS_SCORE};
use skitter::location::{PlayArea, Position};

pub const TARGET_COLS: u16 = 5;
pub const TARGET_ROWS: u16 = 3;

const HUD_ROWS: u16 = 3;

/// Terminal sprite for one insect. Resolution is the shell's job; an
/// unknown asset name falls back to [`placeholder_sprite`] without
/// touching game state.
#[derive(Debug, Clone, Copy)]
pub struct Sprite {
    pub rows: [&'static str; TARGET_ROWS as usize],
    pub color: Color,
}

pub fn resolve_sprite(asset: &str) -> Option<Sprite> {
    match asset {
        "cockroach" => Some(Sprite {
            rows: ["  _  ", "(/_\\)", "/'^'\\"],
            color: Color::Yellow,
        }),
        "mosquito" => Some(Sprite {
            rows: [" \\ / ", "--o--", " / \\ "],
            color: Color::Cyan,
        }),
        "fly" => Some(Sprite {
            rows: [" \\_/ ", "(o_o)", " ' ' "],
            color: Color::White,
        }),
        _ => None,
    }
}

pub fn placeholder_sprite() -> Sprite {
    Sprite {
        rows: ["?????", "?????", "?????"],
        color: Color::Red,
    }
}

/// Splits the terminal into (hud, inner play field). The play field is
/// the bordered remainder; the inner rect is what sprites are placed in
/// and what mouse hits are tested against.
pub fn layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HUD_ROWS), Constraint::Min(1)].as_ref())
        .split(area);
    let field = chunks[1];
    let inner = Rect {
        x: field.x.saturating_add(1),
        y: field.y.saturating_add(1),
        width: field.width.saturating_sub(2),
        height: field.height.saturating_sub(2),
    };
    (chunks[0], inner)
}

/// Maps a logical play-area position onto terminal cells, clamped so the
/// sprite stays inside the field.
pub fn target_rect(field: Rect, play: &PlayArea, pos: Position) -> Rect {
    if field.width == 0 || field.height == 0 {
        return Rect::new(field.x, field.y, 0, 0);
    }
    let max_x = field.width.saturating_sub(TARGET_COLS);
    let max_y = field.height.saturating_sub(TARGET_ROWS);
    let x = ((pos.x as u64 * field.width as u64) / play.width.max(1) as u64) as u16;
    let y = ((pos.y as u64 * field.height as u64) / play.height.max(1) as u64) as u16;
    Rect::new(
        field.x + x.min(max_x),
        field.y + y.min(max_y),
        TARGET_COLS.min(field.width),
        TARGET_ROWS.min(field.height),
    )
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.controller.phase() {
            Phase::Menu => render_menu(self, area, buf),
            _ => render_play(self, area, buf),
        }
    }
}

fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let done = Style::default().fg(Color::Green);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(Span::styled("s k i t t e r", bold.fg(Color::Magenta))),
        Line::from(Span::styled("catch the insect before time runs out", dim)),
        Line::default(),
    ];

    let insects = ["cockroach", "mosquito", "fly"];
    for level in 1..=LEVEL_COUNT {
        let label = format!(
            "[{}]  level {} ({})",
            level,
            level,
            insects[(level - 1) as usize]
        );
        if app.controller.is_level_completed(level) {
            lines.push(Line::from(vec![
                Span::raw(label),
                Span::styled("  ✓ completed", done),
            ]));
        } else {
            lines.push(Line::from(Span::raw(label)));
        }
    }
    lines.push(Line::from(Span::raw(format!(
        "[e]  endless mode (record: {})",
        app.controller.best_endless_score()
    ))));
    lines.push(Line::from(Span::raw("[r]  reset progress")));
    lines.push(Line::from(Span::styled("[esc] quit", dim)));
    lines.push(Line::default());

    if app.confirm_reset {
        lines.push(Line::from(Span::styled(
            "reset all progress and records? [y/n]",
            bold.fg(Color::Red),
        )));
    } else if let Some(ref status) = app.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            bold.fg(Color::Yellow),
        )));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .render(area, buf);
}

fn render_play(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);
    let (hud, field) = layout(area);

    let Some(session) = app.controller.session() else {
        return;
    };

    let mut hud_spans = vec![
        Span::styled(format!(" score {}", session.score), bold.fg(Color::Green)),
        Span::raw("  "),
        Span::styled(
            format!("time {}", session.time_remaining.max(0)),
            if session.time_remaining <= 5 {
                bold.fg(Color::Red)
            } else {
                bold
            },
        ),
    ];
    if session.is_endless() {
        hud_spans.push(Span::raw("  "));
        hud_spans.push(Span::styled(
            format!("record {}", app.controller.best_endless_score()),
            bold.fg(Color::Magenta),
        ));
    } else {
        hud_spans.push(Span::raw("  "));
        hud_spans.push(Span::styled(
            format!("first to {LEVEL_PASS_SCORE} wins"),
            dim,
        ));
    }
    hud_spans.push(Span::raw("  "));
    hud_spans.push(Span::styled("[esc] menu", dim));

    let mut hud_lines = vec![Line::from(hud_spans)];
    if let Some(ref status) = app.status {
        hud_lines.push(Line::from(Span::styled(
            format!(" {status}"),
            bold.fg(Color::Yellow),
        )));
    }
    Paragraph::new(hud_lines).render(hud, buf);

    let field_block = Rect {
        x: field.x.saturating_sub(1),
        y: field.y.saturating_sub(1),
        width: field.width.saturating_add(2),
        height: field.height.saturating_add(2),
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", session.current_target))
        .render(field_block, buf);

    let spec = app.controller.catalog().get(session.current_target);
    let sprite = resolve_sprite(spec.asset).unwrap_or_else(placeholder_sprite);
    let rect = target_rect(field, app.controller.play_area(), session.target_position);
    let style = Style::default().fg(sprite.color).add_modifier(Modifier::BOLD);
    for (row, text) in sprite.rows.iter().enumerate() {
        let y = rect.y + row as u16;
        if y >= field.y + field.height {
            break;
        }
        buf.set_stringn(rect.x, y, text, rect.width as usize, style);
    }
}
