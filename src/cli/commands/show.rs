use anyhow::{Result, bail};
use std::path::Path;

/// Print the panel of the node named by id, label or URL fragment.
pub async fn run(data: Option<&str>, config_path: Option<&Path>, node: &str) -> Result<()> {
    let mut loaded = super::load(data, config_path).await?;

    let update = if node.trim_start().starts_with('#') {
        loaded.explorer.open_fragment(node)
    } else {
        loaded
            .explorer
            .resolve(node)
            .and_then(|id| loaded.explorer.select_node(&id))
    };
    let Some(update) = update else {
        bail!("No node named \"{}\"", node);
    };

    tracing::debug!(
        "Selected {:?}, deep link {:?}",
        loaded.explorer.view().selection(),
        update.fragment
    );
    println!("{}", update.html);
    Ok(())
}
