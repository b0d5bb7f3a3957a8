//! Stepgen CLI Library
//!
//! Argument parsing, error reporting and output formatting for the
//! `stepgen` binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use error::CliError;
