//! ParkSense command-line front end
//!
//! Drives a session from a photo on disk to a rendered parking verdict.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod render;

pub use cli::{Cli, Commands};
pub use error::{CliError, CliResult};
