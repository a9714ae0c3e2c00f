//! ANSI styling for shell output
//!
//! Every colored string in the shell goes through a [`Palette`], so a
//! non-terminal stream (a pipe, a log, a test buffer) gets plain text.

use std::fmt::Display;
use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{style, Color, ResetColor, SetForegroundColor, Stylize};

/// Input prompt marker
const PROMPT_INPUT: &str = ">> ";
/// Echo/output marker
const PROMPT_OUTPUT: &str = "=> ";
/// Diagnostic marker
const PROMPT_ERROR: &str = "!> ";

/// Color switch for one output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// Palette that never emits escape sequences
    pub const PLAIN: Self = Self { enabled: false };

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Foreground color only
    pub fn paint(&self, text: impl Display, color: Color) -> String {
        if self.enabled {
            style(text).with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold foreground color
    pub fn bold(&self, text: impl Display, color: Color) -> String {
        if self.enabled {
            style(text).with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Write raw bytes in a foreground color, without decoding them
    pub fn write_painted<W: Write>(
        &self,
        out: &mut W,
        bytes: &[u8],
        color: Color,
    ) -> io::Result<()> {
        if !self.enabled {
            return out.write_all(bytes);
        }
        queue!(out, SetForegroundColor(color))?;
        out.write_all(bytes)?;
        queue!(out, ResetColor)
    }

    pub fn input_prompt(&self) -> String {
        self.bold(PROMPT_INPUT, Color::Yellow)
    }

    pub fn output_prompt(&self) -> String {
        self.bold(PROMPT_OUTPUT, Color::Green)
    }

    pub fn error_prompt(&self) -> String {
        self.bold(PROMPT_ERROR, Color::Red)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::PLAIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_palette_passes_text_through() {
        let palette = Palette::PLAIN;
        assert_eq!(palette.paint("abc", Color::Red), "abc");
        assert_eq!(palette.bold(42, Color::Green), "42");
        assert_eq!(palette.input_prompt(), ">> ");
        assert_eq!(palette.output_prompt(), "=> ");
        assert_eq!(palette.error_prompt(), "!> ");
    }

    #[test]
    fn test_write_painted_keeps_bytes() {
        let mut out = Vec::new();
        Palette::PLAIN
            .write_painted(&mut out, b"caf\xe9", Color::Green)
            .unwrap();
        assert_eq!(out, b"caf\xe9");

        let mut out = Vec::new();
        Palette::new(true)
            .write_painted(&mut out, b"\xff", Color::Green)
            .unwrap();
        assert!(out.contains(&0xff));
        assert!(out.ends_with(b"\x1b[0m"));
    }

    #[test]
    fn test_enabled_palette_wraps_in_escapes() {
        let palette = Palette::new(true);
        let painted = palette.bold("x", Color::Red);
        // NO_COLOR in the environment turns crossterm styling off
        if std::env::var_os("NO_COLOR").is_none() {
            assert!(painted.starts_with('\x1b'));
            assert!(painted.contains('x'));
            assert!(painted.ends_with("\x1b[0m"));
        }
    }
}
