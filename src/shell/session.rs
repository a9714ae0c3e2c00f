//! Shell session
//!
//! Owns the terminal, the diagnostic stream and the event source for one run
//! of the shell, and dispatches between interactive and batch mode.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crossterm::style::Color;
use tracing::{debug, info, warn};

use super::events::EventSource;
use super::terminal::Terminal;
use super::ShellError;
use crate::config::{Config, ShellConfig};
use crate::diagnostic::{
    Category, Diagnostic, DiagnosticKind, FatalDiagnostic, Reporter, SourceLocation,
};
use crate::loader;
use crate::repl::{self, ReplExit};
use crate::ui::{banner, Palette};

/// Location used for diagnostics about the command line itself
const COMMAND_LINE: &str = "<command line>";

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not yet attached
    Fresh,
    Attached,
    /// Torn down; never attached again
    Detached,
}

/// Shell mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// REPL
    Interactive,
    /// Compile a module
    Batch,
}

/// How `start` finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Repl(ReplExit),
    Compiled,
}

/// Process arguments, program name first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    args: Vec<String>,
}

impl Invocation {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Argument count including the program name
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Mode is chosen by argument count alone
    pub fn mode(&self) -> Mode {
        if self.args.len() <= 1 {
            Mode::Interactive
        } else {
            Mode::Batch
        }
    }

    /// Positional module paths
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .skip(1)
            .map(String::as_str)
            .filter(|arg| !arg.starts_with('-'))
    }

    /// `-` prefixed flags, passed through to the compiler
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .skip(1)
            .map(String::as_str)
            .filter(|arg| arg.starts_with('-'))
    }

    /// First positional module
    pub fn main_module(&self) -> Option<&str> {
        self.modules().next()
    }

    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// One attached shell
pub struct Session<S: EventSource, W: Write, E: Write> {
    state: SessionState,
    mode: Option<Mode>,
    config: ShellConfig,
    placeholder_module: Option<String>,
    events: S,
    terminal: Terminal<W>,
    reporter: Reporter<E>,
    palette: Palette,
}

impl<S: EventSource, W: Write, E: Write> Session<S, W, E> {
    /// `palette` styles the output stream; the reporter carries its own
    pub fn new(
        config: &Config,
        events: S,
        terminal: Terminal<W>,
        reporter: Reporter<E>,
        palette: Palette,
    ) -> Self {
        Self {
            state: SessionState::Fresh,
            mode: None,
            config: config.shell.clone(),
            placeholder_module: config.loader.placeholder_module.clone(),
            events,
            terminal,
            reporter,
            palette,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Set by `start`
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// Attach to the host terminal: interrupts, clear, title, UTF-8, banner.
    ///
    /// The interrupt handler goes in first so that an early Ctrl+C still
    /// ends in a detach.
    pub fn attach(&mut self) -> Result<(), ShellError> {
        self.expect_state(SessionState::Fresh)?;

        debug!("Registering interrupt handler...");
        self.events.watch_interrupts()?;

        self.terminal.clear()?;
        debug!("Attaching shell to host terminal...");
        self.terminal.set_title(&self.config.title)?;
        self.terminal.init_utf8();

        let header = banner::header(&self.palette);
        writeln!(self.terminal.writer(), "{}", header)?;
        self.terminal.writer().flush()?;

        self.state = SessionState::Attached;
        info!("Shell attached");
        Ok(())
    }

    /// Dispatch on the invocation. Returns when the REPL ends or the batch
    /// compile completes.
    pub fn start(&mut self, invocation: &Invocation) -> Result<Outcome, ShellError> {
        self.expect_state(SessionState::Attached)?;

        debug!("Shell started with {} args", invocation.arg_count());
        for (i, arg) in invocation.args().iter().enumerate() {
            debug!("argv[{}] = \"{}\"", i, arg);
        }

        let mode = invocation.mode();
        self.mode = Some(mode);
        match mode {
            Mode::Interactive => {
                info!("Shell mode set to INTERACTIVE");
                let exit = repl::run(&mut self.events, self.terminal.writer(), &self.palette)?;
                info!("REPL finished: {:?}", exit);
                Ok(Outcome::Repl(exit))
            }
            Mode::Batch => {
                info!("Shell mode set to COMPILE");
                self.compile(invocation)
            }
        }
    }

    fn compile(&mut self, invocation: &Invocation) -> Result<Outcome, ShellError> {
        let flags: Vec<&str> = invocation.flags().collect();
        if !flags.is_empty() {
            debug!("Compiler flags: {:?}", flags);
        }

        let path = match (&self.placeholder_module, invocation.main_module()) {
            (Some(placeholder), given) => {
                warn!(
                    "Loading placeholder module \"{}\" instead of {:?}",
                    placeholder, given
                );
                placeholder.clone()
            }
            (None, Some(given)) => given.to_string(),
            (None, None) => {
                let diagnostic = Diagnostic::new(
                    SourceLocation::start_of(COMMAND_LINE),
                    Category::System,
                    DiagnosticKind::NoModuleGiven,
                )
                .with_source_line(invocation.command_line())
                .fatal();
                self.reporter.report(&diagnostic)?;
                return Err(FatalDiagnostic::from(&diagnostic).into());
            }
        };

        info!("Invoking compiler with main module \"{}\"...", path);
        let mut module = loader::load(&path, &mut self.reporter)?;
        debug!("Module {} open: {}", module.path().display(), module.is_open());
        module.release();

        if self.config.pause_after_batch {
            self.pause()?;
        }
        Ok(Outcome::Compiled)
    }

    /// Wait for ENTER (or any other event)
    fn pause(&mut self) -> io::Result<()> {
        debug!("Shell paused");
        let out = self.terminal.writer();
        write!(
            out,
            "{}",
            self.palette.paint("Press ENTER to continue...", Color::DarkCyan)
        )?;
        out.flush()?;

        let event = self.events.next_event();
        debug!("Shell resumed by {:?}", event);

        let out = self.terminal.writer();
        writeln!(out)?;
        out.flush()
    }

    /// Tear down: clear, wait, clear. Runs at most once.
    pub fn detach(&mut self) {
        if self.state == SessionState::Detached {
            return;
        }
        // Errors here have no one left to report to
        let _ = self.terminal.clear();
        debug!("Detaching shell from host terminal...");
        if self.config.detach_delay_ms > 0 {
            thread::sleep(Duration::from_millis(self.config.detach_delay_ms));
        }
        let _ = self.terminal.clear();

        self.state = SessionState::Detached;
        info!("Shell detached");
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), ShellError> {
        if self.state != expected {
            return Err(ShellError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }
}

impl<S: EventSource, W: Write, E: Write> Drop for Session<S, W, E> {
    fn drop(&mut self) {
        self.detach();
    }
}
