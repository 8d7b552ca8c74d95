pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bionet")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Explore biographical networks: detail panels, search and a standalone viewer", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Graph document: a JSON or GEXF file, or an http(s) URL
    #[arg(short, long, global = true, env = "BIONET_DATA")]
    pub data: Option<String>,

    /// Configuration file (defaults to ~/.config/bionet/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Print the detail panel of a node
    #[command(long_about = "Print the detail panel of a node as HTML.\n\n\
        NODE may be a node id, a label (matched case-insensitively), or a\n\
        URL fragment such as '#Francisco_de_Goya'.")]
    Show {
        /// Node id, label, or URL fragment
        node: String,
    },

    /// Print the detail panel of a connection
    Edge {
        /// One endpoint (id or label)
        #[arg(required_unless_present = "id")]
        from: Option<String>,

        /// The other endpoint (id or label)
        #[arg(required_unless_present = "id")]
        to: Option<String>,

        /// Select the edge by id instead of by endpoints
        #[arg(long, conflicts_with_all = ["from", "to"])]
        id: Option<String>,
    },

    /// Find a node or connection
    Search {
        /// Text to search for
        query: String,

        /// Print the panel of the first hit instead of the hit list
        #[arg(long, default_value = "false")]
        html: bool,
    },

    /// Show graph statistics
    Stats,

    /// Check the document for dangling edges, duplicates and self-loops
    Validate {
        /// Exit with an error if any problem is found
        #[arg(long, default_value = "false")]
        strict: bool,
    },

    /// Generate a standalone interactive page
    Viz {
        /// Output HTML file (defaults to a file in the temp directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open the page in the default browser
        #[arg(long, default_value = "false")]
        open: bool,
    },

    /// Export the normalized graph
    Export {
        /// Export format
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Graphml,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Graphml => write!(f, "graphml"),
        }
    }
}
