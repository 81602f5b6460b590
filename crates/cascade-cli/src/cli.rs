//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};

/// Cascade - resolve layered configuration for a production context
#[derive(Parser, Debug)]
#[command(name = "cascade")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a template into one merged configuration
    ///
    /// Finds the most specific config file for the template, expands
    /// its parent chain, and folds the chain into a single document.
    ///
    /// Examples:
    ///   cascade resolve '<episode>_<scene>_<cut>_<progress>' -d ./env -f episode=ep01 -f scene=s01
    ///   cascade resolve '<episode>' -d ./env -f episode=ep01 --substitute --json
    Resolve {
        /// Filename template with <field> tokens
        template: String,

        /// Directory holding the config files
        #[arg(short, long)]
        dir: String,

        /// Field values, repeatable: -f episode=ep01
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Substitute field tokens and @ path markers in string values
        #[arg(long)]
        substitute: bool,

        /// Output as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Show the override chain for a template, root first
    Chain {
        /// Filename template with <field> tokens
        template: String,

        /// Directory holding the config files
        #[arg(short, long)]
        dir: String,

        /// Field values, repeatable: -f episode=ep01
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },

    /// Resolve a template and tag every value with its source file
    Trace {
        /// Filename template with <field> tokens
        template: String,

        /// Directory holding the config files
        #[arg(short, long)]
        dir: String,

        /// Field values, repeatable: -f episode=ep01
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Output as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Assemble the environment for a project selection
    Project {
        /// Project name
        project: String,

        /// Root directory of versioned config files
        #[arg(short, long)]
        root: String,

        /// Variation name
        #[arg(long, default_value = "default")]
        variation: String,

        /// Optional tool name for a tool-specific key file
        #[arg(long)]
        tool: Option<String>,

        /// Output as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}
