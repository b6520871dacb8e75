//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// fob-rsc - coordinated browser + server builds for server components
#[derive(Parser, Debug)]
#[command(
    name = "fob-rsc",
    version,
    about = "Coordinated browser + server builds for server components",
    long_about = "Builds a browser bundle and a server bundle from one configuration.\n\
                  With --split the server pass runs first and every \"use client\" module\n\
                  it finds becomes an extra browser entry point, described in the chunk map."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build both targets and write their output trees
    Build(BuildArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Configuration file (defaults to fob-rsc.config.json in the working directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working directory all relative paths resolve against
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Enable split mode (server pass first, boundary discovery)
    #[arg(long)]
    pub split: bool,
}
