//! Structured diagnostics and their terminal rendering.
//!
//! A [`Diagnostic`] is a plain value: where it happened, what category of
//! problem it is, which known error it is, and the offending source line.
//! [`render`] turns one into the block shown to users:
//!
//! ```text
//! !> main.cross(3,9) Syntax Error [Unknown Error]
//! An unknown error has occurred.
//!    3| let x = ;
//!               ^
//! ```
//!
//! [`Reporter::report`] writes that block to the error stream. A fatal
//! diagnostic comes back as `Err(FatalDiagnostic)`, which callers propagate
//! with `?` so the run ends right after the block is written.

use std::fmt;
use std::io::Write;
use std::num::NonZeroUsize;

use crossterm::style::Color;
use thiserror::Error;
use tracing::debug;
use unicode_width::UnicodeWidthChar;

use crate::ui::Palette;

/// Width of the right-aligned line number column
const GUTTER_WIDTH: usize = 4;
/// Gutter plus the `| ` separator
const CARET_INDENT: usize = GUTTER_WIDTH + 2;

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Resource access (files, streams)
    Io,
    /// Reserved for the parser
    #[cfg_attr(not(test), allow(dead_code))]
    Syntax,
    /// Reserved for host/runtime failures
    System,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Io => "IO",
            Category::Syntax => "Syntax",
            Category::System => "System",
        })
    }
}

/// Known error, carrying its message arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    #[cfg_attr(not(test), allow(dead_code))]
    Unknown,
    ModuleNotFound { module: String },
    NoModuleGiven,
}

impl DiagnosticKind {
    /// Numeric error code
    pub fn code(&self) -> u32 {
        match self {
            DiagnosticKind::Unknown => 0x1,
            DiagnosticKind::ModuleNotFound { .. } => 0x2,
            DiagnosticKind::NoModuleGiven => 0x3,
        }
    }

    /// Symbolic name shown in brackets
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::Unknown => "Unknown Error",
            DiagnosticKind::ModuleNotFound { .. } => "Module Not Found",
            DiagnosticKind::NoModuleGiven => "No Module Given",
        }
    }

    /// Message with arguments substituted
    pub fn message(&self, palette: &Palette) -> String {
        match self {
            DiagnosticKind::Unknown => {
                palette.paint("An unknown error has occurred.", Color::DarkRed)
            }
            DiagnosticKind::ModuleNotFound { module } => format!(
                "{}{}{}",
                palette.paint("The module ", Color::DarkRed),
                palette.bold(module, Color::Red),
                palette.paint(" cannot be found.", Color::DarkRed),
            ),
            DiagnosticKind::NoModuleGiven => {
                palette.paint("No module was given to compile.", Color::DarkRed)
            }
        }
    }
}

/// 1-based position in a named source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: NonZeroUsize,
    pub col: NonZeroUsize,
}

impl SourceLocation {
    /// Returns `None` when `line` or `col` is zero
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn new(file: impl Into<String>, line: usize, col: usize) -> Option<Self> {
        Some(Self {
            file: file.into(),
            line: NonZeroUsize::new(line)?,
            col: NonZeroUsize::new(col)?,
        })
    }

    /// Line 1, column 1 of `file`
    pub fn start_of(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: NonZeroUsize::MIN,
            col: NonZeroUsize::MIN,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.file, self.line, self.col)
    }
}

/// One reportable condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: SourceLocation,
    pub category: Category,
    pub kind: DiagnosticKind,
    pub source_line: String,
    pub fatal: bool,
}

impl Diagnostic {
    /// Non-fatal diagnostic with an empty source line
    pub fn new(location: SourceLocation, category: Category, kind: DiagnosticKind) -> Self {
        Self {
            location,
            category,
            kind,
            source_line: String::new(),
            fatal: false,
        }
    }

    pub fn with_source_line(mut self, line: impl Into<String>) -> Self {
        self.source_line = line.into();
        self
    }

    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }
}

/// Returned by [`Reporter::report`] once a fatal diagnostic is on screen
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{category} Error [{name}] at {location}")]
pub struct FatalDiagnostic {
    pub category: Category,
    pub name: &'static str,
    pub location: SourceLocation,
}

impl From<&Diagnostic> for FatalDiagnostic {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            category: diagnostic.category,
            name: diagnostic.kind.name(),
            location: diagnostic.location.clone(),
        }
    }
}

/// Render a diagnostic block, trailing newline included
pub fn render(diagnostic: &Diagnostic, palette: &Palette) -> String {
    let loc = &diagnostic.location;
    let mut out = String::new();

    // !> file(line,col) Category Error [Name]
    out.push_str(&palette.error_prompt());
    out.push_str(&palette.paint(format!("{}(", loc.file), Color::Red));
    out.push_str(&palette.paint(format!("{},{})", loc.line, loc.col), Color::DarkRed));
    out.push(' ');
    out.push_str(&palette.bold(format!("{} Error", diagnostic.category), Color::DarkRed));
    out.push(' ');
    out.push_str(&palette.bold("[", Color::DarkRed));
    out.push_str(&palette.paint(diagnostic.kind.name(), Color::DarkRed));
    out.push_str(&palette.bold("]", Color::DarkRed));
    out.push('\n');

    out.push_str(&diagnostic.kind.message(palette));
    out.push('\n');

    // Source line with gutter, caret under the column
    out.push_str(&palette.bold(
        format!("{:>width$}|", loc.line, width = GUTTER_WIDTH),
        Color::Black,
    ));
    out.push_str(&palette.bold(format!(" {}", diagnostic.source_line), Color::White));
    out.push('\n');
    let indent = CARET_INDENT + caret_offset(&diagnostic.source_line, loc.col.get());
    out.push_str(&palette.bold(format!("{}^", " ".repeat(indent)), Color::Red));
    out.push('\n');
    out
}

/// Display width of the text before 1-based column `col`
fn caret_offset(source_line: &str, col: usize) -> usize {
    let before = col - 1;
    let mut width = 0;
    let mut counted = 0;
    for ch in source_line.chars().take(before) {
        width += if ch == '\t' { 1 } else { ch.width().unwrap_or(0) };
        counted += 1;
    }
    // Columns past the end of the line
    width + (before - counted)
}

/// Writes diagnostics to an error stream
pub struct Reporter<W: Write> {
    out: W,
    palette: Palette,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, palette: Palette) -> Self {
        Self { out, palette }
    }

    /// Write the diagnostic; `Err` means the run must end now
    pub fn report(&mut self, diagnostic: &Diagnostic) -> Result<(), FatalDiagnostic> {
        debug!(
            code = diagnostic.kind.code(),
            name = diagnostic.kind.name(),
            fatal = diagnostic.fatal,
            "Reporting diagnostic at {}",
            diagnostic.location
        );
        // Stream failures have nowhere better to go
        let _ = self.out.write_all(render(diagnostic, &self.palette).as_bytes());
        let _ = self.out.flush();

        if diagnostic.fatal {
            Err(FatalDiagnostic::from(diagnostic))
        } else {
            Ok(())
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
