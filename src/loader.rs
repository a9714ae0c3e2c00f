//! Module loading
//!
//! Opens source modules for the compiler. Nothing reads them yet; a loaded
//! module only proves the file exists and can be opened.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::diagnostic::{Category, Diagnostic, DiagnosticKind, FatalDiagnostic, Reporter, SourceLocation};

/// An open source module, exclusively owned by the caller
#[derive(Debug)]
pub struct ModuleHandle {
    path: PathBuf,
    stream: Option<BufReader<File>>,
}

impl ModuleHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// False once released
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Close the underlying file. Releasing twice is a no-op.
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            debug!("Freeing module {}", self.path.display());
            drop(stream);
            debug!("Module {} freed", self.path.display());
        }
    }
}

impl Drop for ModuleHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Open `path` for reading.
///
/// A missing or unreadable file is reported as a fatal IO
/// "Module Not Found" diagnostic; no handle is returned in that case.
pub fn load<W: Write>(
    path: &str,
    reporter: &mut Reporter<W>,
) -> Result<ModuleHandle, FatalDiagnostic> {
    debug!("Loading module \"{}\"...", path);

    match File::open(path) {
        Ok(file) => {
            debug!("Module \"{}\" loaded", path);
            Ok(ModuleHandle {
                path: PathBuf::from(path),
                stream: Some(BufReader::new(file)),
            })
        }
        Err(e) => {
            debug!("Module \"{}\" failed to open: {}", path, e);
            let diagnostic = Diagnostic::new(
                SourceLocation::start_of(path),
                Category::Io,
                DiagnosticKind::ModuleNotFound {
                    module: path.to_string(),
                },
            )
            .with_source_line(path)
            .fatal();
            reporter.report(&diagnostic)?;
            // report() only returns Ok for non-fatal diagnostics
            Err(FatalDiagnostic::from(&diagnostic))
        }
    }
}
