//! Capacity planning for testing sites.
//!
//! Two independent calculations share one data model:
//!
//! - [`allocate`] splits a fixed weekly capacity across sites so their waiting times come out
//!   as even as possible, solved as an exact integer program.
//! - [`target_capacity`] sizes the throughput each site needs to reach a target wait.
//!
//! Both derive each site's queue pressure (throughput × wait) on every call and never hold on
//! to the caller's site list.

pub mod capacity;
pub mod config;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod pressure;
pub mod reporting;
pub mod roster;

pub use capacity::target_capacity;
pub use config::{ConfigError, PlannerConfig};
pub use error::{PlanError, RosterError};
pub use models::{
    AllocationPlan, CapacityTotals, Site, SiteAllocation, SiteRequirement, SolveStatus, TargetPlan,
};
pub use optimizer::{allocate, allocate_with, score_allocation, SolverOptions};
pub use pressure::queue_pressure;
pub use roster::SiteRoster;
