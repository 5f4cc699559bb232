use std::path::Path;

use chatdigest_core::{PipelineError, Result};
use chrono::NaiveDateTime;

/// Local wall-clock time; every run captures this once at start.
pub fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Reads a UTF-8 file, reporting absence as [`PipelineError::MissingInput`].
pub fn read_text(path: &Path, what: &str) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PipelineError::MissingInput(
            format!("{what} {} not found", path.display()),
        )),
        Err(e) => Err(e.into()),
    }
}
