//! Clap derive structures for the `capacity-planner` CLI.

pub mod commands;
pub mod error;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// capacity-planner -- spread weekly test capacity so waiting times even out
#[derive(Debug, Parser)]
#[command(
    name = "capacity-planner",
    version,
    about = "Allocate weekly test capacity across sites to equalize waiting times",
    long_about = "Allocate weekly test capacity across sites to equalize waiting times.\n\n\
        `allocate` distributes a fixed total capacity with an exact integer solver;\n\
        `target` computes the capacity every site needs to reach a target wait.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file (defaults to ./capacity-planner.toml when present)
    #[arg(long, env = "CAPACITY_PLANNER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default)
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Where the working set of sites comes from
#[derive(Debug, Args)]
pub struct SiteSource {
    /// Site file (.toml with [[sites]] tables, or .json)
    #[arg(long = "sites", short = 'f')]
    pub file: Option<PathBuf>,

    /// Inline site as NAME:THROUGHPUT:WAIT (repeatable)
    #[arg(long = "site", short = 's', value_name = "NAME:THROUGHPUT:WAIT")]
    pub inline: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Distribute a total weekly capacity so waiting times come out as even as possible
    Allocate(AllocateArgs),

    /// Compute the capacity each site needs to reach a target wait
    Target(TargetArgs),

    /// List the working set with each site's queue pressure
    Sites(SitesArgs),
}

#[derive(Debug, Args)]
pub struct AllocateArgs {
    #[command(flatten)]
    pub source: SiteSource,

    /// Total tests per week to distribute (defaults to the current total)
    #[arg(long, short = 'c', allow_negative_numbers = true)]
    pub capacity: Option<i64>,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    #[command(flatten)]
    pub source: SiteSource,

    /// Target wait in weeks (defaults to `default_target_wait` from config)
    #[arg(long, short = 't', allow_negative_numbers = true)]
    pub target_wait: Option<f64>,
}

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(flatten)]
    pub source: SiteSource,
}
