use anyhow::{Result, bail};
use console::{Emoji, style};
use std::path::Path;

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

pub async fn run(data: Option<&str>, config_path: Option<&Path>, strict: bool) -> Result<()> {
    println!();
    println!("{}", style(" bionet - Validate ").bold().reverse());
    println!();

    let loaded = super::load(data, config_path).await?;
    let report = &loaded.report;
    let index = loaded.explorer.index();

    println!(
        "{}Loaded {} nodes, {} edges from {}",
        CHECK,
        style(index.nodes().len()).green().bold(),
        style(index.edges().len()).green().bold(),
        style(&loaded.source).cyan()
    );

    if report.is_clean() {
        println!("{}No problems found", CHECK);
        println!();
        return Ok(());
    }

    println!();
    if !report.dangling_edges.is_empty() {
        println!("{}Dropped edges with unknown endpoints:", WARN);
        for (edge, missing) in &report.dangling_edges {
            println!(
                "  {} {} references {}",
                style("•").yellow(),
                style(edge).cyan(),
                style(missing).red()
            );
        }
    }
    print_list("Duplicate node ids (first kept):", &report.duplicate_nodes);
    print_list("Repeated connections:", &report.duplicate_connections);
    print_list("Self-loops:", &report.self_loops);
    println!();

    if strict {
        bail!("Graph document has problems");
    }
    Ok(())
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}{}", WARN, title);
    for item in items {
        println!("  {} {}", style("•").yellow(), style(item).cyan());
    }
}
