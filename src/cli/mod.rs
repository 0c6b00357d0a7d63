//! CLI module - Command-line interface for Warden
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Warden - role-based access control admin backend
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Seed roles, permissions and the admin account, then exit
    Seed,

    /// List persons with their roles
    #[command(alias = "ls")]
    Persons,
}

pub use commands::*;
