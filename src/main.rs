//! cross - interactive command-line compiler shell
//!
//! The front end of the Cross language tool. With no arguments it attaches
//! to the terminal and starts a REPL; with module arguments it hands the main
//! module to the compiler.
//!
//! # Quick Start
//!
//! ```text
//! cross                  # Interactive shell (Ctrl+C to exit)
//! cross main.cross       # Compile main.cross
//! cross main.cross -O    # Flags are passed through to the compiler
//! ```
//!
//! # Lifecycle
//!
//! 1. Attach: clear screen, set title, UTF-8 console, interrupt handler, banner
//! 2. Start: REPL or batch compile, chosen by argument count
//! 3. Detach: runs exactly once when the session is dropped, whether the run
//!    ended by interrupt, end of input, completion or a fatal diagnostic
//!
//! # Files
//!
//! - `~/.cross/config.toml` (or `$CROSS_CONFIG`): configuration
//! - `~/.cross/cross.log`: debug log (`$CROSS_LOG` sets the filter)

mod config;
mod diagnostic;
mod loader;
mod repl;
mod shell;
mod ui;

use std::env;
use std::io::{self, IsTerminal};
use std::sync::Mutex;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{Config, LogConfig};
use crate::diagnostic::Reporter;
use crate::shell::{Invocation, Session, ShellError, StdinEvents, Terminal};
use crate::ui::{banner, Palette};

/// Environment variable holding a log filter
const LOG_ENV: &str = "CROSS_LOG";

fn print_version() {
    eprintln!("cross {} (build {}, {})", banner::VERSION, banner::BUILD, banner::platform());
}

fn print_help() {
    let palette = Palette::new(io::stderr().is_terminal());
    eprintln!("{}", banner::header(&palette));
    eprintln!("{}", banner::usage(&palette));
    eprintln!();
    eprintln!("Modes:");
    eprintln!("  (no arguments)        Interactive shell, Ctrl+C to exit");
    eprintln!("  <modules..>           Compile the first module");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!("  -<flag>               Passed through to the compiler");
    eprintln!();
    eprintln!("Configuration: ~/.cross/config.toml (override with ${})", config::CONFIG_ENV);
    eprintln!("Log filter:    ${}", LOG_ENV);
}

fn parse_args() -> Invocation {
    let args: Vec<String> = env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            _ => {}
        }
    }

    Invocation::new(args)
}

/// Log to a file; nothing is opened when the filter is `off`
fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
    let directive = env::var(LOG_ENV).unwrap_or_else(|_| log.level.clone());
    if directive.trim().eq_ignore_ascii_case("off") {
        return Ok(());
    }
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter \"{}\"", directive))?;

    let log_path = log.file_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // Open log file (append mode)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
    Ok(())
}

/// Run one session; returns the process exit status
fn run_shell(config: &Config, invocation: &Invocation) -> anyhow::Result<i32> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let control = config.shell.clear_screen.resolve(stdout.is_terminal());
    let out_palette = Palette::new(config.diagnostics.color.resolve(stdout.is_terminal()));
    let err_palette = Palette::new(config.diagnostics.color.resolve(stderr.is_terminal()));

    let mut session = Session::new(
        config,
        StdinEvents::new(config.repl.max_line_len),
        Terminal::new(stdout, control),
        Reporter::new(stderr, err_palette),
        out_palette,
    );

    let result = session.attach().and_then(|()| session.start(invocation));
    debug!(
        state = ?session.state(),
        mode = ?session.mode(),
        "Session \"{}\" finished",
        session.title()
    );
    // Detach before anything else leaves the process
    drop(session);

    match result {
        Ok(outcome) => {
            info!("Shell finished: {:?}", outcome);
            Ok(0)
        }
        Err(ShellError::Fatal(fatal)) => {
            info!("Stopped by fatal diagnostic: {}", fatal);
            Ok(config.diagnostics.fatal_exit_code)
        }
        Err(e) => Err(e).context("Shell failed"),
    }
}

fn main() -> anyhow::Result<()> {
    let invocation = parse_args();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {}; using default configuration", e);
        Config::default()
    });

    init_logging(&config.log)?;
    info!("cross {} starting...", banner::VERSION);

    let code = run_shell(&config, &invocation)?;
    info!("Exiting with status {}", code);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
