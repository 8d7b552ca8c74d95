use anyhow::Result;
use console::{Emoji, style};
use std::path::Path;

use crate::graph::analytics;

static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
static GRAPH: Emoji<'_, '_> = Emoji("🔗 ", "");
static LONELY: Emoji<'_, '_> = Emoji("🏝️  ", "");

pub async fn run(data: Option<&str>, config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", style(" bionet - Graph Statistics ").bold().reverse());
    println!();

    let loaded = super::load(data, config_path).await?;
    let stats = analytics::compute_stats(loaded.explorer.index());

    println!("{}Graph Overview", CHART);
    println!();
    println!(
        "  {} Nodes:                {}",
        style("•").cyan(),
        style(stats.node_count).green().bold()
    );
    println!(
        "  {} Edges:                {}",
        style("•").cyan(),
        style(stats.edge_count).green().bold()
    );
    println!(
        "  {} Distinct connections: {}",
        style("•").cyan(),
        style(stats.distinct_connections).green().bold()
    );
    println!(
        "  {} Connected components: {}",
        style("•").cyan(),
        style(stats.connected_components).green().bold()
    );
    println!(
        "  {} Density:              {}",
        style("•").cyan(),
        style(format!("{:.4}", stats.density)).green()
    );
    println!(
        "  {} Avg degree:           {}",
        style("•").cyan(),
        style(format!("{:.1}", stats.avg_degree)).green()
    );
    println!(
        "  {} Max degree:           {}",
        style("•").cyan(),
        style(stats.max_degree).green().bold()
    );

    if !stats.top_degree.is_empty() {
        println!();
        println!("{}Most Connected", GRAPH);
        println!();
        for (i, (name, degree)) in stats.top_degree.iter().enumerate() {
            let bar_len = (*degree).min(30);
            let bar = "█".repeat(bar_len);
            println!(
                "  {:>2}. {:<30} {} ({})",
                i + 1,
                style(name).cyan().bold(),
                style(&bar).blue(),
                style(degree).dim(),
            );
        }
    }

    if !stats.isolated_nodes.is_empty() {
        println!();
        println!("{}Unconnected ({})", LONELY, stats.isolated_nodes.len());
        println!();
        for name in &stats.isolated_nodes {
            println!("  {} {}", style("•").dim(), style(name).yellow());
        }
    }

    println!();

    Ok(())
}
