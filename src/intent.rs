use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::game::GameState;
use crate::snake::Direction::{self, *};

/// Columns taken by the left and right borders.
const SURFACE_MARGIN_X: u16 = 2;
/// Rows taken by the message line and the top and bottom borders.
const SURFACE_MARGIN_Y: u16 = 3;

const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);
const MAX_TICK_PERIOD: Duration = Duration::from_secs(10);

/// A player command, decoded from raw terminal input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Quit,
    Reset,
    PauseToggle,
    LoopToggle,
    SpeedUp,
    SpeedDown,
    Move(Direction),
    /// New board extents, already stripped of the border and message rows.
    Resize(i32, i32),
}

/// What the driver has to do after an intent was applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
    /// Restart the tick timer with this period.
    Retime(Duration),
}

/// The period between two ticks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TickSpeed(Duration);

impl TickSpeed {
    pub fn new(period: Duration) -> Self {
        TickSpeed(period.clamp(MIN_TICK_PERIOD, MAX_TICK_PERIOD))
    }

    pub fn period(&self) -> Duration {
        self.0
    }

    pub fn faster(&mut self) -> Duration {
        self.0 = (self.0 * 3 / 4).max(MIN_TICK_PERIOD);
        self.0
    }

    pub fn slower(&mut self) -> Duration {
        self.0 = (self.0 * 4 / 3).min(MAX_TICK_PERIOD);
        self.0
    }
}

impl Intent {
    pub fn from_event(ev: &Event) -> Option<Intent> {
        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => Intent::from_key_event(key),
            Event::Resize(w, h) => Some(Intent::for_surface(*w, *h)),
            _ => None,
        }
    }

    pub fn from_key_event(ev: &KeyEvent) -> Option<Intent> {
        if ev.modifiers.contains(KeyModifiers::CONTROL) {
            return match ev.code {
                KeyCode::Char('c') => Some(Intent::Quit),
                KeyCode::Char('r') => Some(Intent::Reset),
                _ => None,
            };
        }

        let intent = match ev.code {
            KeyCode::Char('p') | KeyCode::Esc => Intent::PauseToggle,
            KeyCode::Char('l') => Intent::LoopToggle,
            KeyCode::Char('+') => Intent::SpeedUp,
            KeyCode::Char('-') => Intent::SpeedDown,
            KeyCode::Char('w') | KeyCode::Up => Intent::Move(Up),
            KeyCode::Char('a') | KeyCode::Left => Intent::Move(Left),
            KeyCode::Char('s') | KeyCode::Down => Intent::Move(Down),
            KeyCode::Char('d') | KeyCode::Right => Intent::Move(Right),
            _ => return None,
        };
        Some(intent)
    }

    /// Resize to the board that fits a terminal of `width`x`height` cells.
    pub fn for_surface(width: u16, height: u16) -> Intent {
        let (w, h) = board_extents(width, height);
        Intent::Resize(w, h)
    }
}

/// Board extents left over once the border and message rows are taken out.
pub fn board_extents(width: u16, height: u16) -> (i32, i32) {
    (
        i32::from(width.saturating_sub(SURFACE_MARGIN_X)),
        i32::from(height.saturating_sub(SURFACE_MARGIN_Y)),
    )
}

pub fn apply(game: &mut GameState, speed: &mut TickSpeed, intent: Intent) -> Outcome {
    debug!(?intent, "applying intent");

    match intent {
        Intent::Quit => return Outcome::Quit,
        Intent::Reset => {
            let board = game.board();
            reset(game, board.width(), board.height());
        }
        Intent::PauseToggle => game.toggle_pause(),
        Intent::LoopToggle => {
            let looping = game.toggle_loop();
            game.show_message(&format!("Loop: {}", looping));
        }
        Intent::SpeedUp => {
            let period = speed.faster();
            game.show_message("Speed increased!");
            return Outcome::Retime(period);
        }
        Intent::SpeedDown => {
            let period = speed.slower();
            game.show_message("Speed decreased...");
            return Outcome::Retime(period);
        }
        Intent::Move(dir) => game.change_direction(dir),
        Intent::Resize(w, h) => reset(game, w, h),
    }

    Outcome::Continue
}

fn reset(game: &mut GameState, width: i32, height: i32) {
    if let Err(err) = game.reset(width, height) {
        warn!(%err, "keeping the previous board");
    }
}
