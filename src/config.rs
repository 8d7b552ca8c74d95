use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::graph::index::DegreePolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub viz: VizConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path or http(s) URL of the graph document
    pub source: Option<String>,
    #[serde(default)]
    pub degree_policy: DegreePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Names shorter than this (in characters) are never auto-linked
    #[serde(default = "default_min_link_name_len")]
    pub min_link_name_len: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            min_link_name_len: default_min_link_name_len(),
        }
    }
}

fn default_min_link_name_len() -> usize {
    2
}

/// Visual constants for the generated page; physics values map onto
/// vis-network's repulsion solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_node_distance")]
    pub node_distance: f64,
    #[serde(default = "default_spring_length")]
    pub spring_length: f64,
    #[serde(default = "default_spring_constant")]
    pub spring_constant: f64,
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_stabilization_iterations")]
    pub stabilization_iterations: u32,
    #[serde(default = "default_base_node_size")]
    pub base_node_size: usize,
    #[serde(default = "default_node_size_step")]
    pub node_size_step: usize,
    #[serde(default = "default_max_node_size")]
    pub max_node_size: usize,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            node_distance: default_node_distance(),
            spring_length: default_spring_length(),
            spring_constant: default_spring_constant(),
            damping: default_damping(),
            stabilization_iterations: default_stabilization_iterations(),
            base_node_size: default_base_node_size(),
            node_size_step: default_node_size_step(),
            max_node_size: default_max_node_size(),
        }
    }
}

impl VizConfig {
    /// Rendered node size for a given degree. Isolated nodes are sized as if
    /// they had one connection.
    pub fn node_size(&self, degree: usize) -> usize {
        let degree = degree.max(1);
        (self.base_node_size + degree * self.node_size_step).min(self.max_node_size)
    }
}

fn default_title() -> String {
    "Network Explorer".to_string()
}

fn default_node_distance() -> f64 {
    250.0
}

fn default_spring_length() -> f64 {
    300.0
}

fn default_spring_constant() -> f64 {
    0.05
}

fn default_damping() -> f64 {
    0.2
}

fn default_stabilization_iterations() -> u32 {
    2500
}

fn default_base_node_size() -> usize {
    10
}

fn default_node_size_step() -> usize {
    2
}

fn default_max_node_size() -> usize {
    60
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("bionet");
        Ok(config_dir)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and a missing file yields the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Configuration file not found at {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = Self::config_path()?;
                if !path.exists() {
                    tracing::debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", config_path.display()))?;

        config.expand_env_vars();

        Ok(config)
    }

    fn expand_env_vars(&mut self) {
        if let Some(source) = &self.data.source {
            self.data.source = Some(expand_env_var(source));
        }
    }
}

/// Expand environment variable references like ${VAR_NAME}
fn expand_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_default()
    } else {
        value.to_string()
    }
}
