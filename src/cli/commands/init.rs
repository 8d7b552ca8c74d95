use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;
use std::path::Path;

use crate::config::Config;

static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

pub async fn run(force: bool, config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", style(" bionet - Initialization ").bold().reverse());
    println!();

    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };

    if config_path.exists() && !force {
        println!(
            "{}Configuration already exists at {}",
            WARN,
            style(config_path.display()).cyan()
        );
        println!("  Use {} to overwrite", style("--force").yellow());
        return Ok(());
    }

    if let Some(dir) = config_path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).context("Failed to create config directory")?;
    }

    let config_content = toml::to_string_pretty(&Config::default())?;
    fs::write(&config_path, config_content).context("Failed to write config file")?;

    println!(
        "{}Created configuration at {}",
        CHECK,
        style(config_path.display()).cyan()
    );

    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();
    println!("{}Next steps:", ROCKET);
    println!();
    println!("  Point {} at your network (path or URL), then:", style("data.source").yellow());
    println!("    {} bionet stats", style("$").dim());
    println!("    {} bionet show \"Francisco de Goya\"", style("$").dim());
    println!("    {} bionet viz --open", style("$").dim());
    println!();

    Ok(())
}
