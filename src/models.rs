//! Data structures shared by the allocation solver and the capacity calculator.

use serde::{Deserialize, Serialize};

use crate::pressure::queue_pressure;

/// A testing location in the working set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    /// Tests offered per week today
    pub current_throughput: u64,
    /// Current waiting time in weeks
    pub current_wait: f64,
}

impl Site {
    pub fn new(name: impl Into<String>, current_throughput: u64, current_wait: f64) -> Self {
        Site {
            name: name.into(),
            current_throughput,
            current_wait,
        }
    }

    /// Queue pressure K, recomputed on every call
    pub fn queue_pressure(&self) -> f64 {
        queue_pressure(self.current_throughput, self.current_wait)
    }
}

/// How far the solver got before returning
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven minimum of the total absolute deviation
    Optimal,
    /// Satisfies every constraint, but the step budget ran out before the proof
    Feasible,
}

/// Allocation outcome for a single site
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SiteAllocation {
    pub name: String,
    pub current_throughput: u64,
    pub current_wait: f64,
    pub assigned_throughput: u64,
    /// K / assigned_throughput, or 0 when nothing was assigned
    pub implied_new_wait: f64,
}

/// Complete result of a fair allocation run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AllocationPlan {
    pub sites: Vec<SiteAllocation>,
    /// Common wait every site would share under perfect equalization (w̄)
    pub reference_wait: f64,
    pub total_capacity: u64,
    /// Sum of absolute errors in fixed-point units
    pub objective: i64,
    pub status: SolveStatus,
}

impl AllocationPlan {
    pub fn assigned_total(&self) -> u64 {
        self.sites.iter().map(|s| s.assigned_throughput).sum()
    }
}

/// Capacity a single site needs to reach the target wait
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SiteRequirement {
    pub name: String,
    pub current_throughput: u64,
    pub required_throughput: u64,
}

/// Aggregate capacity figures across all sites
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CapacityTotals {
    pub current: u64,
    pub needed: u64,
    /// needed - current; negative when current capacity already covers the need
    pub gap: i64,
}

/// Complete result of a target-wait capacity calculation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetPlan {
    pub target_wait: f64,
    pub sites: Vec<SiteRequirement>,
    pub totals: CapacityTotals,
}
