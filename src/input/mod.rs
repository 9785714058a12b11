//! # Input Module
//!
//! Translation of textual commands into [`Intent`]s.
//!
//! Keyboard handling belongs to the outer layer; this module only maps the
//! words and keys a terminal front end reads line by line.

pub mod commands;

pub use commands::*;

use crate::game::Direction;

/// Maps command text to intents.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Whether to accept Vi-style movement keys (hjkl)
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::{Direction, InputHandler, Intent};
    ///
    /// let input = InputHandler::new();
    /// assert_eq!(input.parse("w"), Some(Intent::Move(Direction::Up)));
    /// assert_eq!(input.parse(" P "), Some(Intent::TogglePause));
    /// assert_eq!(input.parse("jump"), None);
    /// ```
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
        }
    }

    /// Parses one command, ignoring case and surrounding whitespace.
    pub fn parse(&self, text: &str) -> Option<Intent> {
        let command = text.trim().to_ascii_lowercase();
        let intent = match command.as_str() {
            "w" | "up" => Intent::Move(Direction::Up),
            "s" | "down" => Intent::Move(Direction::Down),
            "a" | "left" => Intent::Move(Direction::Left),
            "d" | "right" => Intent::Move(Direction::Right),
            "p" | "pause" => Intent::TogglePause,
            "t" | "auto" => Intent::ToggleAutopilot,
            "n" | "new" => Intent::NewGame,
            "q" | "quit" | "exit" => Intent::Quit,
            other if self.vi_keys_enabled => return Self::parse_vi(other),
            _ => return None,
        };
        Some(intent)
    }

    fn parse_vi(command: &str) -> Option<Intent> {
        let direction = match command {
            "k" => Direction::Up,
            "j" => Direction::Down,
            "h" => Direction::Left,
            "l" => Direction::Right,
            _ => return None,
        };
        Some(Intent::Move(direction))
    }

    /// Parses every whitespace-separated command on a line, skipping unknown ones.
    pub fn parse_line(&self, line: &str) -> Vec<Intent> {
        line.split_whitespace()
            .filter_map(|word| self.parse(word))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        let input = InputHandler::new();
        assert_eq!(input.parse("W"), Some(Intent::Move(Direction::Up)));
        assert_eq!(input.parse("left"), Some(Intent::Move(Direction::Left)));
        assert_eq!(input.parse("l"), Some(Intent::Move(Direction::Right)));
    }

    #[test]
    fn test_vi_keys_can_be_disabled() {
        let input = InputHandler {
            vi_keys_enabled: false,
        };
        assert_eq!(input.parse("j"), None);
        assert_eq!(input.parse("s"), Some(Intent::Move(Direction::Down)));
    }

    #[test]
    fn test_session_commands() {
        let input = InputHandler::new();
        assert_eq!(input.parse("n"), Some(Intent::NewGame));
        assert_eq!(input.parse("exit"), Some(Intent::Quit));
        assert_eq!(input.parse("auto"), Some(Intent::ToggleAutopilot));
        assert!(!Intent::Quit.is_gameplay());
        assert!(!Intent::ToggleAutopilot.is_gameplay());
        assert_eq!(Intent::TogglePause.to_string(), "toggle pause");
    }

    #[test]
    fn test_parse_line_skips_noise() {
        let input = InputHandler::new();
        assert_eq!(
            input.parse_line("d ?? s p"),
            vec![
                Intent::Move(Direction::Right),
                Intent::Move(Direction::Down),
                Intent::TogglePause
            ]
        );
    }
}
