//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Sunburst chart core: build hierarchies, lay them out radially, zoom into subtrees
#[derive(Parser, Debug)]
#[command(name = "sunburst")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Directory holding a local .sunburst.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the weighted hierarchy as a tree
    Tree {
        /// JSON table file
        #[arg(value_hint = ValueHint::FilePath)]
        table: PathBuf,
    },

    /// Print rendered sectors, optionally after zooming
    Layout {
        /// JSON table file
        #[arg(value_hint = ValueHint::FilePath)]
        table: PathBuf,
        /// Focus path, '/'-separated (default: root)
        #[arg(short, long)]
        focus: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the breadcrumb trail for a focus
    Breadcrumbs {
        /// JSON table file
        #[arg(value_hint = ValueHint::FilePath)]
        table: PathBuf,
        /// Focus path, '/'-separated
        #[arg(short, long)]
        focus: String,
    },

    /// Print interpolated frames of a zoom transition
    Zoom {
        /// JSON table file
        #[arg(value_hint = ValueHint::FilePath)]
        table: PathBuf,
        /// Focus path, '/'-separated
        #[arg(short, long)]
        focus: String,
        /// Number of frame steps (default: from settings)
        #[arg(long)]
        frames: Option<usize>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List extraction strategies in priority order
    Strategies,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
}
