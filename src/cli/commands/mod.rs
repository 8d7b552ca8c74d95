pub mod edge;
pub mod export;
pub mod init;
pub mod search;
pub mod show;
pub mod stats;
pub mod validate;
pub mod viz;

use anyhow::{Context, Result};
use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::graph::LoadReport;
use crate::graph::loader::{self, DataSource};
use crate::session::Explorer;

static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

/// Everything a command needs once the graph is loaded.
pub struct Loaded {
    pub config: Config,
    pub source: DataSource,
    pub explorer: Explorer,
    pub report: LoadReport,
}

/// Load configuration and the graph, showing a spinner while fetching.
///
/// `--data` (or `BIONET_DATA`) wins over `data.source` in the config file.
pub async fn load(data: Option<&str>, config_path: Option<&Path>) -> Result<Loaded> {
    let config = Config::load(config_path).context("Failed to load configuration")?;

    let raw = data
        .map(str::to_string)
        .or_else(|| config.data.source.clone())
        .filter(|s| !s.trim().is_empty())
        .context("No graph document given. Pass --data, set BIONET_DATA, or set data.source in the config")?;
    let source = DataSource::parse(&raw);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(&format!("{}{{spinner:.green}} {{msg}}", GLOBE))
            .context("Invalid spinner template")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Loading {}...", source));

    let loaded = loader::load(&source).await;
    spinner.finish_and_clear();
    let (graph, report) = loaded.with_context(|| format!("Failed to load graph from {}", source))?;

    if !report.dangling_edges.is_empty() {
        eprintln!(
            "{}Dropped {} edge(s) pointing at unknown nodes (run {} for details)",
            WARN,
            report.dangling_edges.len(),
            style("bionet validate").yellow()
        );
    }

    let explorer = Explorer::new(graph, &config).context("Failed to build the name matcher")?;

    Ok(Loaded {
        config,
        source,
        explorer,
        report,
    })
}
