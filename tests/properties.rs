//! Property checks for the allocation solver and the target-capacity calculator.

use capacity_planner::{allocate, target_capacity, PlanError, Site};
use proptest::prelude::*;

fn site_strategy() -> impl Strategy<Value = Site> {
    ("[A-Za-z]{1,8}", 0u64..200, 0u32..200)
        .prop_map(|(name, throughput, tenths)| Site::new(name, throughput, f64::from(tenths) / 10.0))
}

fn sites_strategy() -> impl Strategy<Value = Vec<Site>> {
    prop::collection::vec(site_strategy(), 1..8)
}

proptest! {
    #[test]
    fn allocation_conserves_capacity(sites in sites_strategy(), capacity in 0i64..500) {
        let plan = allocate(&sites, capacity).expect("non-empty sites with capacity >= 0 are feasible");
        prop_assert_eq!(plan.assigned_total(), capacity as u64);
        prop_assert_eq!(plan.sites.len(), sites.len());
        for (site, result) in sites.iter().zip(&plan.sites) {
            prop_assert_eq!(&site.name, &result.name);
            if result.assigned_throughput == 0 {
                prop_assert_eq!(result.implied_new_wait, 0.0);
            } else {
                let expected = site.queue_pressure() / result.assigned_throughput as f64;
                prop_assert!((result.implied_new_wait - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn allocation_is_idempotent(sites in sites_strategy(), capacity in 0i64..300) {
        prop_assert_eq!(allocate(&sites, capacity), allocate(&sites, capacity));
    }

    #[test]
    fn empty_roster_with_capacity_is_infeasible(capacity in 1i64..10_000) {
        let is_infeasible = matches!(allocate(&[], capacity), Err(PlanError::Infeasible { .. }));
        prop_assert!(is_infeasible);
    }

    #[test]
    fn raising_target_never_raises_requirements(
        sites in sites_strategy(),
        lower_tenths in 1u32..100,
        step_tenths in 0u32..100,
    ) {
        let lower = f64::from(lower_tenths) / 10.0;
        let higher = f64::from(lower_tenths + step_tenths) / 10.0;
        let strict = target_capacity(&sites, lower);
        let relaxed = target_capacity(&sites, higher);

        for (a, b) in strict.sites.iter().zip(&relaxed.sites) {
            prop_assert!(b.required_throughput <= a.required_throughput);
        }
        prop_assert!(relaxed.totals.needed <= strict.totals.needed);
    }

    #[test]
    fn target_totals_are_consistent(sites in sites_strategy(), tenths in 0u32..100) {
        let plan = target_capacity(&sites, f64::from(tenths) / 10.0);
        let current: u64 = sites.iter().map(|s| s.current_throughput).sum();
        let needed: u64 = plan.sites.iter().map(|s| s.required_throughput).sum();
        prop_assert_eq!(plan.totals.current, current);
        prop_assert_eq!(plan.totals.needed, needed);
        prop_assert_eq!(plan.totals.gap, needed as i64 - current as i64);
        prop_assert_eq!(plan.clone(), target_capacity(&sites, f64::from(tenths) / 10.0));
    }
}
