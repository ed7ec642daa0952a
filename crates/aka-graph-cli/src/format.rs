/// Human-readable and JSON output formatting for command results.
///
/// Every command prints through one of the `print_*` functions here, which
/// branch on [`OutputFormat`]. Human mode is a compact tabular rendering;
/// JSON mode serializes a purpose-built `serde`-derived view type so the
/// output shape is stable independent of the core library's internal
/// structs.
use serde::Serialize;

use aka_graph_core::{ClusterReport, ComponentMember};

use crate::cli::OutputFormat;

// ---------------------------------------------------------------------------
// query
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ComponentMemberView<'a> {
    url: &'a str,
    count: usize,
    confidence: f64,
}

/// Prints the result of `aka-graph query <selector>`.
pub fn print_component(selector: &str, members: &[ComponentMember], format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            if members.is_empty() {
                println!("no component found for {selector:?}");
                return;
            }
            println!("component for {selector:?} ({} members):", members.len());
            for member in members {
                println!(
                    "  {:<40} count={:<3} confidence={:.2}",
                    member.record.url, member.count, member.confidence
                );
            }
        }
        OutputFormat::Json => {
            let view: Vec<ComponentMemberView<'_>> = members
                .iter()
                .map(|m| ComponentMemberView {
                    url: &m.record.url,
                    count: m.count,
                    confidence: m.confidence,
                })
                .collect();
            print_json(&view);
        }
    }
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

/// Summary statistics reported by `aka-graph inspect`.
#[derive(Debug, Serialize)]
pub struct InspectSummary {
    pub record_count: usize,
    pub root_count: usize,
    pub largest_component: usize,
}

/// Prints the result of `aka-graph inspect`.
pub fn print_inspect(summary: &InspectSummary, format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            println!("records:            {}", summary.record_count);
            println!("roots (replica 0):  {}", summary.root_count);
            println!("largest component:  {}", summary.largest_component);
        }
        OutputFormat::Json => print_json(summary),
    }
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

/// Prints the result of `aka-graph analyze`.
pub fn print_cluster_report(report: &ClusterReport, format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            let summary = &report.summary;
            println!(
                "{} clusters (largest={}, smallest={}, mean={:.1}, median={:.1})",
                report.clusters.len(),
                summary.largest,
                summary.smallest,
                summary.mean,
                summary.median
            );
            for cluster in &report.clusters {
                println!("  {} — {} member(s)", cluster.root, cluster.size);
                if !cluster.urls.is_empty() {
                    println!("    members: {}", cluster.urls.join(", "));
                }
                if !cluster.overlaps.is_empty() {
                    let overlaps: Vec<String> = cluster
                        .overlaps
                        .iter()
                        .map(|(value, count)| format!("{value} ({count})"))
                        .collect();
                    println!("    overlaps: {}", overlaps.join(", "));
                }
            }
        }
        OutputFormat::Json => print_json(report),
    }
}

// ---------------------------------------------------------------------------
// shared
// ---------------------------------------------------------------------------

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("error: failed to serialize output as JSON: {e}"),
    }
}
