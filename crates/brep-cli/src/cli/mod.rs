//! Command-line interface

pub mod args;
pub mod commands;
pub mod error;
pub mod io;

pub use args::Cli;
pub use commands::run_command;
