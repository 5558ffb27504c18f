use std::io::{self, Stdout, Write, stdout};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use tracing::error;

use crate::game::Snapshot;
use crate::snake::Vector;

const SNAKE_BODY_CHAR: char = '█';
const FRUIT_CHAR: char = '*';
const DEAD_SNAKE_CHAR: char = 'X';

/// Board cell (0, 0) sits below the message line and inside the border.
const BOARD_OFFSET: (u16, u16) = (1, 2);

/// Owns the terminal while the game runs. Dropping it gives the terminal back.
pub struct TermManager {
    stdout: Stdout,
}

impl TermManager {
    pub fn setup() -> io::Result<Self> {
        let mut term = TermManager { stdout: stdout() };
        execute!(term.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(term.stdout, cursor::Hide, cursor::DisableBlinking)?;
        Ok(term)
    }

    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }

    pub fn draw(&mut self, snap: &Snapshot<'_>) -> io::Result<()> {
        queue!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All))?;

        let width = snap.board.width() as u16;
        let height = snap.board.height() as u16;
        self.draw_borders(width, height)?;

        if let Some(msg) = snap.message {
            let line = clip(msg, usize::from(width) + 2);
            queue!(self.stdout, cursor::MoveTo(0, 0), style::Print(line))?;
        }

        for fruit in snap.fruits {
            self.print_cell(*fruit, FRUIT_CHAR, Color::Red)?;
        }

        // Tail first so the head stays visible on overlapping segments.
        for (i, pos) in snap.body.iter().enumerate().rev() {
            if !snap.board.contains(*pos) {
                continue;
            }
            let (ch, color) = match (i, snap.dead) {
                (_, true) => (DEAD_SNAKE_CHAR, Color::DarkRed),
                (0, false) => (snap.head_char, Color::Yellow),
                _ => (SNAKE_BODY_CHAR, Color::White),
            };
            self.print_cell(*pos, ch, color)?;
        }

        let center = (width / 2 + BOARD_OFFSET.0, height / 2 + BOARD_OFFSET.1);
        if snap.paused {
            self.print_centered(center, "Paused", Color::Red)?;
        } else if snap.dead || snap.board_full {
            let line = format!("Score: {}  (Ctrl+R to play again)", snap.score);
            self.print_centered(center, &line, Color::Red)?;
        }

        self.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_borders(&mut self, width: u16, height: u16) -> io::Result<()> {
        let top = BOARD_OFFSET.1 - 1;
        let bottom = height + BOARD_OFFSET.1;
        let right = width + BOARD_OFFSET.0;

        for x in 0..=right {
            let ch = if x == 0 || x == right {'+'} else {'-'};
            queue!(self.stdout, cursor::MoveTo(x, top), style::Print(ch))?;
            queue!(self.stdout, cursor::MoveTo(x, bottom), style::Print(ch))?;
        }

        for y in top + 1..bottom {
            queue!(self.stdout, cursor::MoveTo(0, y), style::Print('|'))?;
            queue!(self.stdout, cursor::MoveTo(right, y), style::Print('|'))?;
        }

        Ok(())
    }

    fn print_cell(&mut self, pos: Vector, ch: char, color: Color) -> io::Result<()> {
        let (x, y) = (pos.x as u16 + BOARD_OFFSET.0, pos.y as u16 + BOARD_OFFSET.1);
        queue!(self.stdout,
               cursor::MoveTo(x, y),
               style::SetForegroundColor(color),
               style::Print(ch),
               style::ResetColor)
    }

    fn print_centered(&mut self, center: (u16, u16), text: &str, bg: Color) -> io::Result<()> {
        let x = center.0.saturating_sub(text.len() as u16 / 2);
        queue!(self.stdout,
               cursor::MoveTo(x, center.1),
               style::SetBackgroundColor(bg),
               style::Print(text),
               style::ResetColor)
    }

    fn restore(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            error!(%err, "failed to restore the terminal");
        }
    }
}

/// The longest prefix of `text` that fits in `cols` columns.
fn clip(text: &str, cols: usize) -> &str {
    match text.char_indices().nth(cols) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_messages_are_clipped_to_the_frame() {
        assert_eq!(clip("Speed increased!", 7), "Speed i");
        assert_eq!(clip("Loop: true", 12), "Loop: true");
        assert_eq!(clip("Loop: true", 10), "Loop: true");
        assert_eq!(clip("█████", 2), "██");
        assert_eq!(clip("abc", 0), "");
    }
}
