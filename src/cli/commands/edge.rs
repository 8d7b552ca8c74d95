use anyhow::{Context, Result, bail};
use std::path::Path;

/// Print the panel of a connection, picked by id or by its two endpoints.
/// When several edges join the same pair, the first one is shown.
pub async fn run(
    data: Option<&str>,
    config_path: Option<&Path>,
    from: Option<String>,
    to: Option<String>,
    id: Option<String>,
) -> Result<()> {
    let mut loaded = super::load(data, config_path).await?;
    let explorer = &mut loaded.explorer;

    let edge_id = match id {
        Some(id) => id,
        None => {
            let from = from.context("Missing first endpoint")?;
            let to = to.context("Missing second endpoint")?;
            let a = explorer
                .resolve(&from)
                .with_context(|| format!("No node named \"{}\"", from))?;
            let b = explorer
                .resolve(&to)
                .with_context(|| format!("No node named \"{}\"", to))?;
            let edges = explorer.index().edges_between(&a, &b);
            let Some(edge) = edges.first() else {
                bail!("\"{}\" and \"{}\" are not connected", from, to);
            };
            if edges.len() > 1 {
                tracing::info!("{} edges join {} and {}, showing {}", edges.len(), a, b, edge.id);
            }
            edge.id.clone()
        }
    };

    let Some(update) = explorer.select_edge(&edge_id) else {
        bail!("No edge with id \"{}\"", edge_id);
    };
    tracing::debug!("Selected {:?}", explorer.view().selection());
    println!("{}", update.html);
    Ok(())
}
