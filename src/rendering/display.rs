//! # Display Management
//!
//! Plain-text frames of a [`WorldSnapshot`]: the board as glyphs, a status
//! panel and a short message log.

use crate::game::{CellContent, GameStatus, Position, WorldSnapshot};
use std::fmt::Write;

/// Text display for the chase game.
///
/// Rendering never touches live game state. Each frame is built from one
/// snapshot, so a frame always shows a single consistent tick.
#[derive(Debug, Clone)]
pub struct AsciiDisplay {
    /// Message history
    pub messages: Vec<String>,
    /// Maximum number of messages to keep
    pub max_messages: usize,
    /// Messages shown under each frame
    pub visible_messages: usize,
}

impl AsciiDisplay {
    /// Creates a display with an empty message log.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::{AsciiDisplay, ChaseConfig, GameEngine, ManualClock};
    /// use std::sync::Arc;
    ///
    /// let (tx, _rx) = crossbeam_channel::bounded(8);
    /// let engine = GameEngine::new(ChaseConfig::for_testing(3), Arc::new(ManualClock::new()), tx);
    /// engine.initialize(11, 15).unwrap();
    ///
    /// let frame = AsciiDisplay::new().render_game(&engine.snapshot().unwrap());
    /// assert!(frame.contains('C'));
    /// ```
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            max_messages: 100,
            visible_messages: 3,
        }
    }

    /// Renders the complete frame: board, status panel and recent messages.
    pub fn render_game(&self, snapshot: &WorldSnapshot) -> String {
        let mut frame = self.render_board(snapshot);
        frame.push_str(&self.render_status(snapshot));
        frame.push('\n');
        for message in self.recent_messages() {
            frame.push_str(message);
            frame.push('\n');
        }
        frame
    }

    /// Board glyphs, one line per row.
    pub fn render_board(&self, snapshot: &WorldSnapshot) -> String {
        let board = &snapshot.board;
        let mut rows: Vec<Vec<char>> = (0..board.rows() as i32)
            .map(|row| {
                (0..board.cols() as i32)
                    .map(|col| Self::content_glyph(board.content(Position::new(row, col))))
                    .collect()
            })
            .collect();

        let mut place = |pos: Position, glyph: char| {
            if let Some(cell) = rows
                .get_mut(pos.row as usize)
                .and_then(|line| line.get_mut(pos.col as usize))
            {
                *cell = glyph;
            }
        };
        for pursuer in &snapshot.pursuers {
            place(pursuer.position, Self::pursuer_glyph(pursuer.id, pursuer.frightened));
        }
        place(snapshot.player.position, 'C');

        let mut out = String::with_capacity(board.rows() * (board.cols() + 1));
        for line in rows {
            out.extend(line);
            out.push('\n');
        }
        out
    }

    /// Gets the display character for a cell's content.
    pub fn content_glyph(content: Option<&CellContent>) -> char {
        match content {
            Some(CellContent::Empty) => ' ',
            Some(CellContent::Wall) | None => '#',
            Some(CellContent::Dot) => '.',
            Some(CellContent::PowerPellet) => 'o',
            Some(CellContent::PowerUp(_)) => '*',
        }
    }

    /// Pursuer id digit, or `w` while it can be eaten.
    pub fn pursuer_glyph(id: usize, frightened: bool) -> char {
        if frightened {
            'w'
        } else {
            char::from_digit((id % 10) as u32, 10).unwrap_or('G')
        }
    }

    /// One line of score, lives, time and status, then active power-ups.
    pub fn render_status(&self, snapshot: &WorldSnapshot) -> String {
        let secs = snapshot.elapsed_ms / 1000;
        let mut line = format!(
            "Score: {}  Lives: {}  Time: {:02}:{:02}  {}",
            snapshot.score,
            snapshot.lives,
            secs / 60,
            secs % 60,
            Self::status_label(snapshot.status)
        );
        for active in &snapshot.active_power_ups {
            let _ = write!(
                line,
                "  [{} {}s]",
                active.kind.description(),
                active.remaining_secs
            );
        }
        line
    }

    pub fn status_label(status: GameStatus) -> &'static str {
        match status {
            GameStatus::Menu => "MENU",
            GameStatus::Playing => "PLAYING",
            GameStatus::Paused => "PAUSED",
            GameStatus::GameOver => "GAME OVER",
            GameStatus::Victory => "VICTORY",
        }
    }

    /// Adds a message to the message history.
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }

    /// The newest messages, oldest first.
    pub fn recent_messages(&self) -> &[String] {
        let start = self.messages.len().saturating_sub(self.visible_messages);
        &self.messages[start..]
    }
}

impl Default for AsciiDisplay {
    fn default() -> Self {
        Self::new()
    }
}
