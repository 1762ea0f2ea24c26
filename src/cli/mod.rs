//! Command-line interface for tunelink.
//!
//! This module provides CLI commands for looking up tags in vendor catalogs,
//! inspecting files and converting them between codecs.

mod commands;

pub use commands::{Cli, Commands, CredentialArgs, run_command};
