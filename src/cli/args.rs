//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Portfolio visualizations rendered to SVG: expandable tree, charts, network, timelines and maps
#[derive(Parser, Debug)]
#[command(name = "portviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the portfolio page and one SVG per view
    Render {
        /// Output directory (default: output_dir from config)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out: Option<PathBuf>,
        /// Render only these views (repeatable)
        #[arg(long = "view")]
        views: Vec<String>,
        /// Do not fetch map boundaries
        #[arg(long)]
        offline: bool,
    },

    /// Inspect and toggle the portfolio tree
    Tree {
        #[command(subcommand)]
        command: TreeCommands,
    },

    /// Render the interactive world map
    Map {
        /// Do not fetch map boundaries
        #[arg(long)]
        offline: bool,
        /// Zoom factor around the map center
        #[arg(long)]
        zoom: Option<f64>,
        /// Output file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show build and configuration info
    Info,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum TreeCommands {
    /// Print the tree, collapsed nodes marked [+]
    Show {
        /// Collapse these nodes first (label or `/` path, repeatable)
        #[arg(long)]
        collapse: Vec<String>,
        /// Collapse everything below this depth (root is 0)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Toggle nodes in order and write the final animated SVG
    Toggle {
        /// Nodes to toggle (label or `/` path)
        #[arg(required = true)]
        nodes: Vec<String>,
        /// Output file (default: <output_dir>/tree.svg)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a commented config template
    Template,

    /// Show config paths
    Path,
}
