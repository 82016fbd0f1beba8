//! Command-line interface: argument parsing, command handlers and terminal output.

pub mod cli;
