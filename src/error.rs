//! Error types for the planning core and the site roster.

use std::path::PathBuf;

use thiserror::Error;

/// Outcomes of a planning call that are not a usable plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("invalid site entry: {reason}")]
    InvalidInput { reason: String },

    #[error("no allocation could be computed: {reason}")]
    Infeasible { reason: String },
}

impl PlanError {
    pub(crate) fn infeasible(reason: impl Into<String>) -> Self {
        Self::Infeasible {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Failures while reading a site file into a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read site file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML site file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse JSON site file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported site file extension for {path} (expected .toml or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("site spec '{spec}' is malformed: {reason}")]
    MalformedSpec { spec: String, reason: String },

    #[error(transparent)]
    Plan(#[from] PlanError),
}
