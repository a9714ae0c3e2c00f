//! The interactive shell around the compiler.
//!
//! - **session**: attach/start/detach lifecycle and mode dispatch
//! - **events**: stdin lines and interrupts as one event stream
//! - **terminal**: screen clearing, title and console setup
//!
//! # Lifecycle
//!
//! ```text
//! Fresh ──attach()──> Attached ──start()──> (REPL | batch compile)
//!   │                    │
//!   └────────────────────┴──drop / detach()──> Detached (final)
//! ```

pub mod events;
pub mod session;
pub mod terminal;

use std::io;

use thiserror::Error;

use crate::diagnostic::FatalDiagnostic;

pub use events::{EventSource, ShellEvent, StdinEvents};
#[cfg(test)]
pub use events::LineReader;
pub use session::{Invocation, Session, SessionState};
pub use terminal::Terminal;

#[derive(Error, Debug)]
pub enum ShellError {
    /// A fatal diagnostic has already been shown
    #[error(transparent)]
    Fatal(#[from] FatalDiagnostic),

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to install interrupt handler: {0}")]
    Signal(#[source] ctrlc::Error),

    #[error("Session is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },
}
