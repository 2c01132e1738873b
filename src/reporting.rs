//! Reporting and output formatting module
//! Renders plans as console tables or JSON

use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::models::{AllocationPlan, Site, SolveStatus, TargetPlan};

#[derive(Tabled)]
struct AllocationRow {
    #[tabled(rename = "Site")]
    name: String,
    #[tabled(rename = "Current tests/week")]
    current_throughput: u64,
    #[tabled(rename = "Current wait")]
    current_wait: String,
    #[tabled(rename = "Proposed tests/week")]
    assigned_throughput: u64,
    #[tabled(rename = "New wait")]
    implied_new_wait: String,
}

#[derive(Tabled)]
struct RequirementRow {
    #[tabled(rename = "Site")]
    name: String,
    #[tabled(rename = "Current tests/week")]
    current_throughput: u64,
    #[tabled(rename = "Required tests/week")]
    required_throughput: u64,
}

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "Site")]
    name: String,
    #[tabled(rename = "Current tests/week")]
    current_throughput: u64,
    #[tabled(rename = "Current wait")]
    current_wait: String,
    #[tabled(rename = "Queue pressure")]
    queue_pressure: String,
}

fn weeks(value: f64) -> String {
    format!("{value:.1} w")
}

fn banner(title: &str) -> String {
    let width = 78;
    let bar = "═".repeat(width);
    format!("╔{bar}╗\n║{title:^width$}║\n╚{bar}╝\n")
}

fn table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Allocation table with the common target wait in the header
pub fn render_allocation(plan: &AllocationPlan) -> String {
    let rows: Vec<AllocationRow> = plan
        .sites
        .iter()
        .map(|s| AllocationRow {
            name: s.name.clone(),
            current_throughput: s.current_throughput,
            current_wait: weeks(s.current_wait),
            assigned_throughput: s.assigned_throughput,
            implied_new_wait: weeks(s.implied_new_wait),
        })
        .collect();

    let mut out = banner("FAIR CAPACITY ALLOCATION");
    out.push_str(&format!(
        "\nTotal capacity: {} tests/week\nTarget common wait: about {:.2} weeks\n",
        plan.total_capacity, plan.reference_wait
    ));
    if plan.status == SolveStatus::Feasible {
        out.push_str("Note: step budget reached, allocation is feasible but not proven optimal\n");
    }
    out.push('\n');
    out.push_str(&table(&rows));
    out
}

/// Requirement table followed by the capacity gap summary
pub fn render_target(plan: &TargetPlan) -> String {
    let rows: Vec<RequirementRow> = plan
        .sites
        .iter()
        .map(|s| RequirementRow {
            name: s.name.clone(),
            current_throughput: s.current_throughput,
            required_throughput: s.required_throughput,
        })
        .collect();

    let mut out = banner("CAPACITY NEEDED FOR TARGET WAIT");
    out.push_str(&format!("\nTarget wait: {:.1} weeks\n\n", plan.target_wait));
    out.push_str(&table(&rows));
    out.push_str(&format!(
        "\n\nCurrent total capacity:  {}\nRequired total capacity: {}\nCapacity gap:            {:+}\n",
        plan.totals.current, plan.totals.needed, plan.totals.gap
    ));
    out
}

/// Working set listing with each site's queue pressure
pub fn render_sites(sites: &[Site]) -> String {
    let rows: Vec<SiteRow> = sites
        .iter()
        .map(|s| SiteRow {
            name: s.name.clone(),
            current_throughput: s.current_throughput,
            current_wait: weeks(s.current_wait),
            queue_pressure: format!("{:.1}", s.queue_pressure()),
        })
        .collect();
    let total = sites
        .iter()
        .fold(0u64, |acc, s| acc.saturating_add(s.current_throughput));

    let mut out = table(&rows);
    out.push_str(&format!("\n{} sites, {} tests/week in total\n", sites.len(), total));
    out
}

/// Pretty-printed JSON
pub fn render_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}
