//! Human-readable rendering of a run summary

use bloomload_core::application::RunSummary;
use colored::Colorize;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "Check")]
    name: String,
    #[tabled(rename = "Passed")]
    passes: u64,
    #[tabled(rename = "Failed")]
    fails: u64,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "p50 (ms)")]
    p50: String,
    #[tabled(rename = "p95 (ms)")]
    p95: String,
    #[tabled(rename = "max (ms)")]
    max: String,
}

pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n\n", "Load Test Summary".cyan().bold()));
    out.push_str(&format!("  {} {}\n", "Scenario:".bold(), summary.scenario));
    out.push_str(&format!("  {} {}\n", "Virtual users:".bold(), summary.vus));
    out.push_str(&format!(
        "  {} {:.1} s\n",
        "Elapsed:".bold(),
        summary.elapsed_ms() as f64 / 1000.0
    ));
    out.push_str(&format!("  {} {}\n\n", "Iterations:".bold(), summary.iterations));

    if summary.checks.is_empty() {
        out.push_str(&format!("  {}\n", "No checks recorded".yellow()));
        return out;
    }

    let rows: Vec<CheckRow> = summary
        .checks
        .iter()
        .map(|check| CheckRow {
            name: check.name.clone(),
            passes: check.passes,
            fails: check.fails,
            rate: format!("{:.2}%", check.pass_rate * 100.0),
            p50: format!("{:.1}", check.latency.p50_ms),
            p95: format!("{:.1}", check.latency.p95_ms),
            max: format!("{:.1}", check.latency.max_ms),
        })
        .collect();
    out.push_str(&Table::new(rows).to_string());
    out.push_str("\n\n");

    let rate = format!(
        "{:.2}% ({} / {})",
        summary.pass_rate() * 100.0,
        summary.total_passes(),
        summary.total_checks()
    );
    let rate = if summary.total_fails() == 0 {
        rate.green()
    } else {
        rate.red()
    };
    out.push_str(&format!("  {} {}\n", "Checks passed:".bold(), rate));
    out
}
