//! CLI module - Command-line interface for anime-sentinel
//!
//! Each subcommand runs one stage against the shared JSON document.

mod commands;

use clap::{Parser, Subcommand};

/// anime-sentinel - seasonal anime catalog collector and gallery builder
#[derive(Parser)]
#[command(name = "anime-sentinel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog and rebuild the anime document
    #[command(alias = "c")]
    Collect,

    /// Update score, wish count and cover of every stored anime
    #[command(alias = "r")]
    Refresh,

    /// Build the static HTML gallery from the document
    #[command(alias = "b", alias = "build")]
    Render,

    /// Run collect, refresh and render in sequence
    #[command(alias = "all")]
    Pipeline,

    /// Create default config file
    Init,
}

pub use commands::*;
