//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use capacity_planner::{ConfigError, PlanError, RosterError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const INFEASIBLE: i32 = 3;
    pub const INPUT: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No sites given")]
    #[diagnostic(
        code(capacity_planner::no_sites),
        help("Pass a site file with --sites FILE, or sites inline with --site NAME:THROUGHPUT:WAIT.")
    )]
    NoSites,

    #[error("Could not compute an allocation")]
    #[diagnostic(
        code(capacity_planner::infeasible),
        help("{reason}\nCheck that the total capacity is positive and at least one site is listed.")
    )]
    Infeasible { reason: String },

    #[error("Invalid site entry: {reason}")]
    #[diagnostic(
        code(capacity_planner::invalid_input),
        help("Every site needs a non-empty name and a non-negative wait.")
    )]
    InvalidInput { reason: String },

    #[error(transparent)]
    #[diagnostic(code(capacity_planner::site_file))]
    Roster(RosterError),

    #[error(transparent)]
    #[diagnostic(
        code(capacity_planner::config),
        help("Check capacity-planner.toml and CAPACITY_PLANNER_* environment variables.")
    )]
    Config(#[from] ConfigError),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(capacity_planner::output))]
    Output(#[from] serde_json::Error),
}

impl From<PlanError> for CliError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Infeasible { reason } => Self::Infeasible { reason },
            PlanError::InvalidInput { reason } => Self::InvalidInput { reason },
        }
    }
}

impl From<RosterError> for CliError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::Plan(plan) => plan.into(),
            other => Self::Roster(other),
        }
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoSites | Self::Config(_) => exit_code::USAGE,
            Self::Infeasible { .. } => exit_code::INFEASIBLE,
            Self::InvalidInput { .. } | Self::Roster(_) => exit_code::INPUT,
            Self::Output(_) => exit_code::GENERAL,
        }
    }
}
