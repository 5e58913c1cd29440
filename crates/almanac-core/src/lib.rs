//! Shared building blocks for the almanac workspace: error kinds, layered
//! configuration and the text formats used at the command boundary.

pub mod config;
pub mod constants;
pub mod error;
