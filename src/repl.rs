//! Read-echo-print loop for interactive mode.
//!
//! Nothing is evaluated yet: each non-blank line is written back after the
//! output marker. The loop ends on an interrupt or at end of input.

use std::io::{self, Write};

use crossterm::style::Color;
use tracing::debug;

use crate::shell::{EventSource, ShellEvent};
use crate::ui::Palette;

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplExit {
    Interrupted,
    EndOfInput,
}

/// Run until interrupted or input ends
pub fn run<S, W>(events: &mut S, out: &mut W, palette: &Palette) -> io::Result<ReplExit>
where
    S: EventSource + ?Sized,
    W: Write,
{
    writeln!(out, "{}", palette.bold("Press CTRL+C to exit", Color::Cyan))?;
    writeln!(out)?;

    loop {
        write!(out, "{}", palette.input_prompt())?;
        out.flush()?;

        match events.next_event() {
            ShellEvent::Line(line) => {
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                write!(out, "{}", palette.output_prompt())?;
                palette.write_painted(out, &line, Color::DarkGreen)?;
                writeln!(out)?;
            }
            ShellEvent::Eof => {
                debug!("REPL reached end of input");
                writeln!(out)?;
                out.flush()?;
                return Ok(ReplExit::EndOfInput);
            }
            ShellEvent::Interrupted => {
                debug!("REPL interrupted");
                writeln!(out)?;
                out.flush()?;
                return Ok(ReplExit::Interrupted);
            }
        }
    }
}
