//! Host terminal control
//!
//! Screen clearing and the window title are skipped when screen control is
//! off, so piped output stays free of escape sequences.

use std::io::{self, Write};

use crossterm::execute;
use crossterm::terminal::SetTitle;
use tracing::debug;

/// Cursor home + erase display
pub const CLEAR_SCREEN: &str = "\x1b[1;1H\x1b[2J";
/// Reset attributes
const RESET: &str = "\x1b[0m";

/// Output stream of the shell plus the escape sequences it may send
pub struct Terminal<W: Write> {
    out: W,
    control: bool,
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W, control: bool) -> Self {
        Self { out, control }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    /// Clear the screen and home the cursor
    pub fn clear(&mut self) -> io::Result<()> {
        if self.control {
            debug!("Clearing screen...");
            write!(self.out, "{}{}", CLEAR_SCREEN, RESET)?;
        }
        self.out.flush()
    }

    /// Set the terminal window title
    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        if self.control {
            debug!("Setting terminal title...");
            execute!(self.out, SetTitle(title))?;
        }
        Ok(())
    }

    /// Switch the console to UTF-8 output
    pub fn init_utf8(&self) {
        #[cfg(windows)]
        {
            use windows::Win32::System::Console::{
                GetConsoleMode, GetStdHandle, SetConsoleMode, SetConsoleOutputCP, CONSOLE_MODE,
                ENABLE_VIRTUAL_TERMINAL_PROCESSING, STD_OUTPUT_HANDLE,
            };

            unsafe {
                debug!("Setting Windows code page to UTF-8...");
                if let Err(e) = SetConsoleOutputCP(65001) {
                    debug!("SetConsoleOutputCP failed: {:?}", e);
                }

                // Colors need VT processing on conhost
                let handle = GetStdHandle(STD_OUTPUT_HANDLE).unwrap_or_default();
                let mut mode = CONSOLE_MODE(0);
                if GetConsoleMode(handle, &mut mode).is_ok() {
                    let new_mode = CONSOLE_MODE(mode.0 | ENABLE_VIRTUAL_TERMINAL_PROCESSING.0);
                    if let Err(e) = SetConsoleMode(handle, new_mode) {
                        debug!("SetConsoleMode failed: {:?}", e);
                    }
                }
            }
        }

        #[cfg(not(windows))]
        debug!("Standard streams are UTF-8; no locale change needed");
    }
}
