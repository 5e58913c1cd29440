use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// How commands reach the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Read commands from standard input.
    Interactive,
    /// Read commands from a file.
    Headless,
}

#[derive(Debug, Parser)]
#[command(name = "almanac", version, about = "Multi-calendar event manager")]
pub struct Cli {
    #[arg(long, value_enum, ignore_case = true)]
    pub mode: Mode,

    /// Command file, required in headless mode.
    #[arg(required_if_eq("mode", "headless"))]
    pub file: Option<PathBuf>,
}
