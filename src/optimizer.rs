//! Fair allocation solver
//! Splits a fixed integer capacity across sites so that each site's queue pressure sits as
//! close as possible to the common reference rate times its assigned capacity.
//!
//! The model is an integer program over fixed-point quantities:
//!
//! ```text
//! minimize   sum_i |K_i - w * x_i|
//! subject to sum_i x_i = C,  0 <= x_i <= C,  |K_i - w * x_i| <= max_error
//! ```
//!
//! Each term is convex in `x_i`, so placing units on the site with the cheapest marginal cost,
//! starting from the propagated lower bounds, reaches the global optimum. Units are placed in
//! batches per marginal tier, so the work grows with the number of sites, not with `C`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PlanError;
use crate::models::{AllocationPlan, Site, SiteAllocation, SolveStatus};
use crate::pressure::total_pressure;

/// Fixed-point scale applied to pressures and the reference rate before solving
pub const DEFAULT_PRECISION_FACTOR: i64 = 100;

/// Tuning knobs for the integer solver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Real quantities are multiplied by this and truncated toward zero
    pub precision_factor: i64,
    /// Cap on units placed in marginal-cost order; `None` always runs to a proven optimum
    pub max_steps: Option<u64>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            precision_factor: DEFAULT_PRECISION_FACTOR,
            max_steps: None,
        }
    }
}

/// Allocate `total_capacity` across `sites` with the default solver options
pub fn allocate(sites: &[Site], total_capacity: i64) -> Result<AllocationPlan, PlanError> {
    allocate_with(sites, total_capacity, &SolverOptions::default())
}

/// Allocate `total_capacity` across `sites`, minimizing total deviation from the common wait
pub fn allocate_with(
    sites: &[Site],
    total_capacity: i64,
    options: &SolverOptions,
) -> Result<AllocationPlan, PlanError> {
    if options.precision_factor < 1 {
        return Err(PlanError::invalid(format!(
            "precision factor must be at least 1, got {}",
            options.precision_factor
        )));
    }

    let pressures: Vec<f64> = sites.iter().map(Site::queue_pressure).collect();
    let pressure_sum = total_pressure(&pressures);
    let reference_wait = reference_wait(pressure_sum, total_capacity);

    if total_capacity <= 0 {
        warn!(total_capacity, "non-positive total capacity, reference wait falls back to 0");
    }
    let Ok(capacity) = u64::try_from(total_capacity) else {
        return Err(PlanError::infeasible(format!(
            "total capacity {total_capacity} is negative and cannot be split into non-negative shares"
        )));
    };
    if sites.is_empty() && capacity > 0 {
        return Err(PlanError::infeasible(format!(
            "there are no sites to receive {capacity} units of capacity"
        )));
    }

    let model = FairShareModel::build(
        &pressures,
        pressure_sum,
        reference_wait,
        capacity,
        options.precision_factor,
    );
    debug!(
        sites = sites.len(),
        capacity,
        rate = model.rate,
        max_error = model.max_error,
        "built fair-share model"
    );

    let solution = model.solve(options.max_steps)?;
    match solution.status {
        SolveStatus::Optimal => info!(
            objective = solution.objective,
            steps = solution.steps,
            "optimal allocation found"
        ),
        SolveStatus::Feasible => warn!(
            objective = solution.objective,
            steps = solution.steps,
            "solver step budget exhausted, returning best-effort allocation"
        ),
    }

    let allocations = sites
        .iter()
        .zip(&pressures)
        .zip(&solution.units)
        .enumerate()
        .map(|(index, ((site, &pressure), &assigned))| {
            debug!(
                site = %site.name,
                assigned,
                deviation = model.cost(index, assigned),
                "site allocation"
            );
            SiteAllocation {
                name: site.name.clone(),
                current_throughput: site.current_throughput,
                current_wait: site.current_wait,
                assigned_throughput: assigned,
                implied_new_wait: implied_wait(pressure, assigned),
            }
        })
        .collect();

    Ok(AllocationPlan {
        sites: allocations,
        reference_wait,
        total_capacity: capacity,
        objective: solution.objective,
        status: solution.status,
    })
}

/// Objective value the solver would report for an arbitrary split of `total_capacity`
///
/// Useful for judging a hand-made plan against the solver's. The split is not checked
/// against the capacity constraint.
pub fn score_allocation(
    sites: &[Site],
    total_capacity: i64,
    assigned: &[u64],
    options: &SolverOptions,
) -> i64 {
    let pressures: Vec<f64> = sites.iter().map(Site::queue_pressure).collect();
    let pressure_sum = total_pressure(&pressures);
    let capacity = u64::try_from(total_capacity).unwrap_or(0);
    let model = FairShareModel::build(
        &pressures,
        pressure_sum,
        reference_wait(pressure_sum, total_capacity),
        capacity,
        options.precision_factor,
    );
    model.objective(assigned)
}

/// Wait a site would see with `throughput` tests per week; 0 when nothing is offered
pub fn implied_wait(pressure: f64, throughput: u64) -> f64 {
    if throughput > 0 {
        pressure / throughput as f64
    } else {
        0.0
    }
}

fn reference_wait(pressure_sum: f64, total_capacity: i64) -> f64 {
    if total_capacity > 0 {
        pressure_sum / total_capacity as f64
    } else {
        0.0
    }
}

/// Truncating fixed-point conversion, saturating at the i64 range
fn to_fixed(value: f64, precision_factor: i64) -> i64 {
    (value * precision_factor as f64) as i64
}

fn units_as_i64(units: u64) -> i64 {
    i64::try_from(units).unwrap_or(i64::MAX)
}

struct Solution {
    units: Vec<u64>,
    objective: i64,
    status: SolveStatus,
    steps: u64,
}

/// Fixed-point integer model of one allocation problem, built fresh per call
struct FairShareModel {
    pressures: Vec<i64>,
    rate: i64,
    capacity: u64,
    max_error: i64,
}

impl FairShareModel {
    fn build(
        pressures: &[f64],
        pressure_sum: f64,
        reference_wait: f64,
        capacity: u64,
        precision_factor: i64,
    ) -> Self {
        FairShareModel {
            pressures: pressures
                .iter()
                .map(|&k| to_fixed(k, precision_factor))
                .collect(),
            rate: to_fixed(reference_wait, precision_factor),
            capacity,
            max_error: to_fixed(pressure_sum, precision_factor),
        }
    }

    fn error(&self, site: usize, units: u64) -> i64 {
        self.pressures[site].saturating_sub(self.rate.saturating_mul(units_as_i64(units)))
    }

    fn cost(&self, site: usize, units: u64) -> i64 {
        self.error(site, units).saturating_abs()
    }

    fn marginal(&self, site: usize, units: u64) -> i64 {
        self.cost(site, units + 1) - self.cost(site, units)
    }

    fn objective(&self, units: &[u64]) -> i64 {
        units
            .iter()
            .enumerate()
            .take(self.pressures.len())
            .fold(0i64, |acc, (site, &x)| acc.saturating_add(self.cost(site, x)))
    }

    /// Range of units for `site` that keeps |error| within `max_error` and x within [0, C]
    fn bounds(&self, site: usize) -> Option<(u64, u64)> {
        if self.max_error < 0 {
            return None;
        }
        let k = i128::from(self.pressures[site]);
        let bound = i128::from(self.max_error);
        let capacity = i128::from(self.capacity);

        let (lower, upper) = if self.rate == 0 {
            if k.abs() > bound {
                return None;
            }
            (0, capacity)
        } else {
            // rate >= 0 whenever max_error >= 0
            let rate = i128::from(self.rate);
            let lower = -((bound - k).div_euclid(rate));
            let upper = (k + bound).div_euclid(rate);
            (lower.max(0), upper.min(capacity))
        };

        if lower > upper {
            return None;
        }
        Some((u64::try_from(lower).ok()?, u64::try_from(upper).ok()?))
    }

    /// Bound propagation followed by greedy marginal placement
    fn solve(&self, max_steps: Option<u64>) -> Result<Solution, PlanError> {
        let n = self.pressures.len();
        let mut lower = Vec::with_capacity(n);
        let mut upper = Vec::with_capacity(n);
        for site in 0..n {
            let Some((lo, hi)) = self.bounds(site) else {
                return Err(PlanError::infeasible(format!(
                    "site #{} cannot keep its deviation within {}",
                    site + 1,
                    self.max_error
                )));
            };
            lower.push(lo);
            upper.push(hi);
        }

        let floor_sum = lower.iter().fold(0u64, |acc, &lo| acc.saturating_add(lo));
        let ceiling_sum = upper.iter().fold(0u64, |acc, &hi| acc.saturating_add(hi));
        debug!(floor_sum, ceiling_sum, "propagated site bounds");
        if floor_sum > self.capacity || ceiling_sum < self.capacity {
            return Err(PlanError::infeasible(format!(
                "site bounds admit between {floor_sum} and {ceiling_sum} units, but {} must be placed",
                self.capacity
            )));
        }

        let mut units = lower;
        let remaining = self.capacity - floor_sum;
        // The greedy order never depends on how many units are left, so a capped run is
        // the same prefix of the full run
        let steps = max_steps.map_or(remaining, |limit| limit.min(remaining));
        let placed = self.place_greedy(&mut units, &upper, steps);
        if placed < steps {
            return Err(PlanError::infeasible(format!(
                "{} units left with every site at its upper bound",
                remaining - placed
            )));
        }

        let mut status = SolveStatus::Optimal;
        if steps < remaining {
            status = SolveStatus::Feasible;
            fill_in_order(&mut units, &upper, remaining - steps);
        }

        let objective = self.objective(&units);
        Ok(Solution {
            units,
            objective,
            status,
            steps,
        })
    }

    /// Unit count below which every extra unit lowers the deviation by the full rate
    fn pivot(&self, site: usize) -> i128 {
        i128::from(self.pressures[site]).div_euclid(i128::from(self.rate))
    }

    /// Place `count` units in the order a cheapest-marginal-first greedy would, where ties
    /// go to the site holding fewer units, then the earlier site.
    ///
    /// A site's marginal cost is `-rate` below its pivot, `+rate` above it, and one
    /// crossing value in between, so the greedy runs in three batched tiers instead of
    /// one unit at a time. Returns the number of units placed.
    fn place_greedy(&self, units: &mut [u64], upper: &[u64], count: u64) -> u64 {
        if self.rate == 0 {
            // Every marginal is zero
            return water_fill(units, upper, count);
        }

        // Warm start: raise every site toward its pivot
        let pivots: Vec<u64> = (0..units.len())
            .map(|site| {
                let pivot = self.pivot(site).clamp(0, i128::from(upper[site]));
                u64::try_from(pivot).unwrap_or(upper[site]).max(units[site])
            })
            .collect();
        let mut placed = water_fill(units, &pivots, count);

        let mut crossings: Vec<(i64, u64, usize)> = (0..units.len())
            .filter(|&site| units[site] < upper[site])
            .map(|site| (self.marginal(site, units[site]), units[site], site))
            .filter(|&(marginal, _, _)| marginal < self.rate)
            .collect();
        crossings.sort_unstable();
        for (_, _, site) in crossings {
            if placed == count {
                return placed;
            }
            units[site] += 1;
            placed += 1;
        }

        placed + water_fill(units, upper, count - placed)
    }
}

/// Raise the lowest sites first, earlier sites breaking ties, until `count` units are placed
/// or every site reaches its cap. Returns the number of units placed.
fn water_fill(units: &mut [u64], caps: &[u64], count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    let needed = |level: u64| -> u128 {
        units
            .iter()
            .zip(caps)
            .map(|(&x, &cap)| u128::from(cap.min(level).saturating_sub(x)))
            .sum()
    };

    let room = needed(u64::MAX);
    if room <= u128::from(count) {
        for (x, &cap) in units.iter_mut().zip(caps) {
            *x = (*x).max(cap);
        }
        return u64::try_from(room).unwrap_or(count);
    }

    // needed(low) <= count < needed(high)
    let mut low = 0u64;
    let mut high = caps.iter().copied().max().unwrap_or(0);
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if needed(mid) <= u128::from(count) {
            low = mid;
        } else {
            high = mid;
        }
    }

    let mut leftover = u128::from(count) - needed(low);
    for (x, &cap) in units.iter_mut().zip(caps) {
        *x = (*x).max(cap.min(low));
    }
    for (x, &cap) in units.iter_mut().zip(caps) {
        if leftover == 0 {
            break;
        }
        if *x == low && cap > low {
            *x += 1;
            leftover -= 1;
        }
    }
    count
}

/// Best-effort completion: top sites up to their upper bound in list order
fn fill_in_order(units: &mut [u64], upper: &[u64], mut remaining: u64) {
    for (x, &hi) in units.iter_mut().zip(upper) {
        if remaining == 0 {
            break;
        }
        let take = (hi - *x).min(remaining);
        *x += take;
        remaining -= take;
    }
}
