use anyhow::Result;
use console::{Emoji, style};
use std::path::Path;

use crate::search::{self, SearchHit};

static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[x] ");

pub async fn run(
    data: Option<&str>,
    config_path: Option<&Path>,
    query: &str,
    html: bool,
) -> Result<()> {
    let mut loaded = super::load(data, config_path).await?;
    let explorer = &mut loaded.explorer;

    if html {
        let (method, update) = explorer.search(query)?;
        tracing::debug!("\"{}\" matched by {}", query, method);
        println!("{}", update.html);
        return Ok(());
    }

    let Some(result) = search::search(explorer.index(), query) else {
        println!("{}No match for {}", CROSS, style(query.trim()).yellow());
        return Err(crate::error::SearchError::NoMatch(query.trim().to_string()).into());
    };

    println!(
        "{}{} hit(s) by {}",
        SEARCH,
        style(result.hits.len()).green().bold(),
        style(result.method).cyan()
    );
    println!();

    let index = explorer.index();
    for (i, hit) in result.hits.iter().enumerate() {
        match hit {
            SearchHit::Node(id) => {
                let name = index.node(id).map(|n| n.display_name()).unwrap_or(id.as_str());
                println!(
                    "  {:>2}. {} {}",
                    i + 1,
                    style(name).cyan().bold(),
                    style(format!("[{}]", id)).dim()
                );
            }
            SearchHit::Edge(id) => {
                let Some(edge) = index.edge(id) else {
                    continue;
                };
                let name_of = |node_id: &str| {
                    index
                        .node(node_id)
                        .map(|n| n.display_name().to_string())
                        .unwrap_or_else(|| node_id.to_string())
                };
                println!(
                    "  {:>2}. {} {} {} {}",
                    i + 1,
                    style(name_of(&edge.from)).cyan().bold(),
                    style("↔").dim(),
                    style(name_of(&edge.to)).cyan().bold(),
                    style(format!("[{}]", id)).dim()
                );
            }
        }
    }
    println!();

    Ok(())
}
