use anyhow::Result;
use console::{Emoji, style};
use std::path::{Path, PathBuf};

use crate::cli::ExportFormat;

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static FILE: Emoji<'_, '_> = Emoji("📁 ", "");

pub async fn run(
    data: Option<&str>,
    config_path: Option<&Path>,
    format: ExportFormat,
    output: PathBuf,
) -> Result<()> {
    println!();
    println!("{}", style(" bionet - Export ").bold().reverse());
    println!();

    let loaded = super::load(data, config_path).await?;
    let index = loaded.explorer.index();

    println!(
        "{}Loaded {} nodes, {} edges",
        CHECK,
        style(index.nodes().len()).green().bold(),
        style(index.edges().len()).green().bold()
    );

    let format_name = match format {
        ExportFormat::Json => "JSON",
        ExportFormat::Csv => "CSV",
        ExportFormat::Graphml => "GraphML",
    };

    print!("{}Exporting to {}... ", FILE, style(format_name).cyan());

    match format {
        ExportFormat::Json => {
            crate::export::export_json(index, &output)?;
            println!("{}", style("done").green());
            println!();
            println!("  {} {}", style("→").dim(), style(output.display()).cyan().underlined());
        }
        ExportFormat::Csv => {
            let nodes_path = output.with_extension("nodes.csv");
            let edges_path = output.with_extension("edges.csv");
            crate::export::export_csv(index, &nodes_path, &edges_path)?;
            println!("{}", style("done").green());
            println!();
            println!("  {} {}", style("→").dim(), style(nodes_path.display()).cyan().underlined());
            println!("  {} {}", style("→").dim(), style(edges_path.display()).cyan().underlined());
        }
        ExportFormat::Graphml => {
            crate::export::export_graphml(index, &output)?;
            println!("{}", style("done").green());
            println!();
            println!("  {} {}", style("→").dim(), style(output.display()).cyan().underlined());
        }
    }

    println!();

    Ok(())
}
