//! Capacity requirement module
//! Closed-form sizing of the weekly throughput each site needs to reach a target wait

use tracing::{debug, warn};

use crate::models::{CapacityTotals, Site, SiteRequirement, TargetPlan};

/// Smallest whole throughput that brings `pressure` down to `target_wait`
/// Returns 0 for a non-positive (or NaN) target and saturates at `u64::MAX`
pub fn required_throughput(pressure: f64, target_wait: f64) -> u64 {
    if target_wait > 0.0 {
        (pressure / target_wait).ceil().max(0.0) as u64
    } else {
        0
    }
}

/// Compute per-site requirements and the overall capacity gap for `target_wait` weeks
pub fn target_capacity(sites: &[Site], target_wait: f64) -> TargetPlan {
    if target_wait.is_nan() || target_wait <= 0.0 {
        warn!(target_wait, "non-positive target wait, every requirement falls back to 0");
    }

    let requirements: Vec<SiteRequirement> = sites
        .iter()
        .map(|site| SiteRequirement {
            name: site.name.clone(),
            current_throughput: site.current_throughput,
            required_throughput: required_throughput(site.queue_pressure(), target_wait),
        })
        .collect();

    let totals = capacity_totals(&requirements);
    debug!(
        sites = requirements.len(),
        current = totals.current,
        needed = totals.needed,
        gap = totals.gap,
        "computed capacity requirements"
    );

    TargetPlan {
        target_wait,
        sites: requirements,
        totals,
    }
}

/// Sum current and required throughput, saturating at `u64::MAX`; the gap is signed
pub fn capacity_totals(requirements: &[SiteRequirement]) -> CapacityTotals {
    let current = requirements
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.current_throughput));
    let needed = requirements
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.required_throughput));
    CapacityTotals {
        current,
        needed,
        gap: signed(needed) - signed(current),
    }
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_site_target() {
        let sites = vec![Site::new("A", 10, 4.0)];
        let plan = target_capacity(&sites, 2.0);

        assert_eq!(plan.sites[0].required_throughput, 20);
        assert_eq!(
            plan.totals,
            CapacityTotals {
                current: 10,
                needed: 20,
                gap: 10
            }
        );
    }

    #[test]
    fn test_requirement_rounds_up() {
        // 7 * 3 = 21 pressure, 21 / 5 = 4.2 -> 5
        assert_eq!(required_throughput(21.0, 5.0), 5);
        assert_eq!(required_throughput(20.0, 5.0), 4);
        assert_eq!(required_throughput(0.0, 5.0), 0);
    }

    #[test]
    fn test_zero_target_gives_zero_requirements() {
        let sites = vec![Site::new("A", 10, 4.0), Site::new("B", 3, 12.0)];
        let plan = target_capacity(&sites, 0.0);

        assert!(plan.sites.iter().all(|s| s.required_throughput == 0));
        assert_eq!(plan.totals.needed, 0);
        assert_eq!(plan.totals.gap, -13);
    }

    #[test]
    fn test_negative_and_nan_targets_are_degenerate() {
        assert_eq!(required_throughput(40.0, -1.0), 0);
        assert_eq!(required_throughput(40.0, f64::NAN), 0);
    }

    #[test]
    fn test_gap_negative_when_over_capacity() {
        let sites = vec![Site::new("Roomy", 50, 1.0), Site::new("Tight", 10, 6.0)];
        let plan = target_capacity(&sites, 5.0);

        // 50/5 = 10, 60/5 = 12
        assert_eq!(plan.sites[0].required_throughput, 10);
        assert_eq!(plan.sites[1].required_throughput, 12);
        assert_eq!(plan.totals.current, 60);
        assert_eq!(plan.totals.needed, 22);
        assert_eq!(plan.totals.gap, -38);
    }

    #[test]
    fn test_extreme_pressure_saturates_totals() {
        let sites = vec![Site::new("A", 1, 1e300), Site::new("B", 1, 1e300)];
        let plan = target_capacity(&sites, 1.0);

        assert_eq!(plan.sites[0].required_throughput, u64::MAX);
        assert_eq!(plan.totals.needed, u64::MAX);
        assert_eq!(plan.totals.current, 2);
        assert_eq!(plan.totals.gap, i64::MAX - 2);
    }

    #[test]
    fn test_empty_sites() {
        let plan = target_capacity(&[], 3.0);
        assert!(plan.sites.is_empty());
        assert_eq!(
            plan.totals,
            CapacityTotals {
                current: 0,
                needed: 0,
                gap: 0
            }
        );
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let sites = vec![
            Site::new("North", 4, 2.0),
            Site::new("South", 9, 1.0),
            Site::new("North", 1, 10.0),
        ];
        let plan = target_capacity(&sites, 2.0);
        let names: Vec<&str> = plan.sites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["North", "South", "North"]);
        let required: Vec<u64> = plan.sites.iter().map(|s| s.required_throughput).collect();
        assert_eq!(required, vec![4, 5, 5]);
    }
}
