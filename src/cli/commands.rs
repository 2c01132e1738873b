//! Command handlers: build the roster, run a calculation, print the result.

use capacity_planner::reporting::{render_allocation, render_json, render_sites, render_target};
use capacity_planner::{allocate_with, target_capacity, PlannerConfig, SiteRoster};

use super::error::CliError;
use super::{AllocateArgs, Command, OutputFormat, SiteSource, SitesArgs, TargetArgs};

pub fn dispatch(
    command: Command,
    config: &PlannerConfig,
    output: OutputFormat,
) -> Result<String, CliError> {
    match command {
        Command::Allocate(args) => allocate_cmd(&args, config, output),
        Command::Target(args) => target_cmd(&args, config, output),
        Command::Sites(args) => sites_cmd(&args, output),
    }
}

fn build_roster(source: &SiteSource) -> Result<SiteRoster, CliError> {
    let mut roster = SiteRoster::new();
    if let Some(path) = &source.file {
        roster.load_file(path)?;
    }
    for spec in &source.inline {
        roster.add_spec(spec)?;
    }
    if roster.is_empty() {
        return Err(CliError::NoSites);
    }
    tracing::debug!(sites = roster.len(), "built site roster");
    Ok(roster)
}

fn allocate_cmd(
    args: &AllocateArgs,
    config: &PlannerConfig,
    output: OutputFormat,
) -> Result<String, CliError> {
    let roster = build_roster(&args.source)?;
    let capacity = match args.capacity {
        Some(capacity) => capacity,
        None => i64::try_from(roster.current_total()).unwrap_or(i64::MAX),
    };

    let plan = allocate_with(roster.sites(), capacity, &config.solver)?;
    match output {
        OutputFormat::Table => Ok(render_allocation(&plan)),
        OutputFormat::Json => Ok(render_json(&plan)?),
    }
}

fn target_cmd(
    args: &TargetArgs,
    config: &PlannerConfig,
    output: OutputFormat,
) -> Result<String, CliError> {
    let roster = build_roster(&args.source)?;
    let target_wait = args.target_wait.unwrap_or(config.default_target_wait);

    let plan = target_capacity(roster.sites(), target_wait);
    match output {
        OutputFormat::Table => Ok(render_target(&plan)),
        OutputFormat::Json => Ok(render_json(&plan)?),
    }
}

fn sites_cmd(args: &SitesArgs, output: OutputFormat) -> Result<String, CliError> {
    let roster = build_roster(&args.source)?;
    match output {
        OutputFormat::Table => Ok(render_sites(roster.sites())),
        OutputFormat::Json => Ok(render_json(roster.sites())?),
    }
}
