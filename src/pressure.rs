//! Queue pressure calculation
//! Turns a site's current throughput and wait into the accumulated work both calculators consume

/// Little's-law style work in system: throughput (tests/week) times wait (weeks)
pub fn queue_pressure(current_throughput: u64, current_wait: f64) -> f64 {
    current_throughput as f64 * current_wait
}

/// Sum of queue pressure over a set of sites
pub fn total_pressure<'a>(pressures: impl IntoIterator<Item = &'a f64>) -> f64 {
    pressures.into_iter().sum()
}
