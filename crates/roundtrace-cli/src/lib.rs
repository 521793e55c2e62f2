// Thin consumer of roundtrace-engine: read a log file, reconstruct the
// session, print one view of it. All reconstruction logic lives in the engine.

mod args;
mod commands;
pub mod config;
pub mod context;
mod handlers;
mod logging;
pub mod presentation;

pub use args::{Cli, Commands, LogArgs};
pub use commands::run;
pub use logging::init_logging;
