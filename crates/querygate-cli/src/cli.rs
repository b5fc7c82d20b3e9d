//! Argument parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Route queries to HTTP tools, grounded answers or a tool-calling agent
#[derive(Parser, Debug)]
#[command(name = "querygate", version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (defaults to ~/.config/querygate/config.yaml)
    #[arg(long, global = true, env = "QUERYGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer one query, streaming the result to stdout
    Route {
        /// The query; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Manage registered tools
    Tools {
        #[command(subcommand)]
        action: ToolsCommands,
    },

    /// Serve a registry snapshot over MCP on stdio (spawned by `route`)
    #[command(hide = true)]
    Bridge {
        #[arg(long)]
        snapshot: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ToolsCommands {
    /// List registered tools
    List {
        /// Only tools of this type (SQL or API)
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
    },

    /// Show one tool's configuration
    Show { name: String },

    /// Register or replace tools from a JSON or YAML file (one definition or a list)
    Add { file: PathBuf },

    /// Remove a tool
    Delete { name: String },
}
