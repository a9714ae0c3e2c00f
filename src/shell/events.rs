//! Shell input events
//!
//! Every blocking wait in the shell (the REPL prompt, the batch pause)
//! receives a [`ShellEvent`]. On a real terminal two helper threads feed one
//! channel:
//!
//! ```text
//! stdin reader thread ──Line/Eof──┐
//!                                 ├──> mpsc ──> Session (sole consumer)
//! ctrlc handler thread ─Interrupted┘
//! ```
//!
//! The interrupt handler never tears anything down itself. It only posts an
//! event; the session unwinds on its own thread and detaches on drop.

use std::io::{self, BufRead, Read};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use tracing::{debug, warn};

use super::ShellError;

/// Something the shell was waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// One input line as raw bytes, trailing newline removed
    Line(Vec<u8>),
    /// Input stream closed
    Eof,
    /// Ctrl+C / SIGINT
    Interrupted,
}

/// Source of shell events
pub trait EventSource {
    /// Start delivering [`ShellEvent::Interrupted`]
    fn watch_interrupts(&mut self) -> Result<(), ShellError>;

    /// Block until the next event
    fn next_event(&mut self) -> ShellEvent;
}

/// Bounded line reader.
///
/// Reads at most `max_len` bytes (newline included) per line; the rest of a
/// longer line comes back on the following reads.
pub struct LineReader<R: BufRead> {
    reader: R,
    max_len: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, max_len: usize) -> Self {
        let max_len = max_len.max(1);
        Self {
            reader,
            max_len,
            buf: Vec::with_capacity(max_len),
        }
    }

    /// `None` at end of input. Bytes are passed through undecoded.
    pub fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.buf.clear();
        let n = self
            .reader
            .by_ref()
            .take(self.max_len as u64)
            .read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        Ok(Some(self.buf.clone()))
    }
}

impl<R: BufRead> EventSource for LineReader<R> {
    fn watch_interrupts(&mut self) -> Result<(), ShellError> {
        Ok(())
    }

    fn next_event(&mut self) -> ShellEvent {
        match self.read_line() {
            Ok(Some(line)) => ShellEvent::Line(line),
            Ok(None) => ShellEvent::Eof,
            Err(e) => {
                warn!("Input read failed, treating as end of input: {}", e);
                ShellEvent::Eof
            }
        }
    }
}

/// Events from the process's stdin and the OS interrupt
pub struct StdinEvents {
    tx: Sender<ShellEvent>,
    rx: Receiver<ShellEvent>,
    max_line_len: usize,
    reader_started: bool,
    eof: bool,
}

impl StdinEvents {
    pub fn new(max_line_len: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            max_line_len,
            reader_started: false,
            eof: false,
        }
    }

    /// Stdin is only touched once something waits on it
    fn spawn_reader(&mut self) {
        if self.reader_started {
            return;
        }
        self.reader_started = true;

        let tx = self.tx.clone();
        let max_line_len = self.max_line_len;
        // Never joined: at exit it may still be blocked in read()
        thread::spawn(move || {
            let mut lines = LineReader::new(io::stdin().lock(), max_line_len);
            loop {
                let event = lines.next_event();
                let done = event == ShellEvent::Eof;
                if tx.send(event).is_err() || done {
                    break;
                }
            }
            debug!("Stdin reader finished");
        });
    }
}

impl EventSource for StdinEvents {
    fn watch_interrupts(&mut self) -> Result<(), ShellError> {
        let tx = self.tx.clone();
        ctrlc::set_handler(move || {
            let _ = tx.send(ShellEvent::Interrupted);
        })
        .map_err(ShellError::Signal)?;
        debug!("Interrupt handler installed");
        Ok(())
    }

    fn next_event(&mut self) -> ShellEvent {
        if self.eof {
            // Reader is gone; only an interrupt can still arrive
            return match self.rx.try_recv() {
                Ok(ShellEvent::Interrupted) => ShellEvent::Interrupted,
                Ok(_) | Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                    ShellEvent::Eof
                }
            };
        }

        self.spawn_reader();
        // `self.tx` keeps the channel connected
        let event = self.rx.recv().unwrap_or(ShellEvent::Eof);
        if event == ShellEvent::Eof {
            self.eof = true;
        }
        event
    }
}

#[cfg(test)]
impl EventSource for std::collections::VecDeque<ShellEvent> {
    fn watch_interrupts(&mut self) -> Result<(), ShellError> {
        Ok(())
    }

    fn next_event(&mut self) -> ShellEvent {
        self.pop_front().unwrap_or(ShellEvent::Eof)
    }
}
