//! Feeds command lines into a session.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::controller::{Controller, Flow};
use crate::error::AppResult;

/// ## Summary
/// Executes every line of `input` until it ends or `exit` is read. Blank
/// lines and lines starting with `#` are skipped.
///
/// ## Errors
/// Returns an error if reading input or writing output fails.
pub fn run<R: BufRead, W: Write>(controller: &mut Controller<W>, input: R) -> AppResult<()> {
    for line in input.lines() {
        let line = line?;
        let command = line.trim();
        if command.is_empty() || command.starts_with('#') {
            continue;
        }
        tracing::debug!(command, "Processing command");
        if controller.process_line(command)? == Flow::Exit {
            tracing::info!("Exit requested");
            break;
        }
    }
    Ok(())
}

/// ## Summary
/// Executes the commands stored in `path`.
///
/// ## Errors
/// Returns an error if the file cannot be read or output cannot be written.
pub fn run_headless<W: Write>(controller: &mut Controller<W>, path: &Path) -> AppResult<()> {
    tracing::info!(path = %path.display(), "Running command file");
    let file = File::open(path)?;
    run(controller, BufReader::new(file))
}
