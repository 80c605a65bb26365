use crate::model::Framework;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prioritizer")]
#[command(
    author,
    version,
    about = "Prioritize product features with the RICE framework using an LLM"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (searches upward for .prioritizer.yml by default)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write JSON logs to this file (rotated daily)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a .prioritizer.yml with default settings
    Init {
        /// Model identifier to store in the config
        #[arg(long)]
        model: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Ask the model to score features and show the prioritized list
    #[command(visible_alias = "p")]
    Prioritize(PrioritizeArgs),

    /// Show a previously exported CSV as a sorted table
    Show {
        /// Exported CSV file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the JSON HTTP service
    Serve {
        /// Port to listen on (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        completion: CompletionArgs,

        /// Password required once the free trial is used
        #[arg(long, env = "PRIORITIZER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct CompletionArgs {
    /// Model identifier (overrides config)
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the chat-completion API (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Completion service credential
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct PrioritizeArgs {
    /// Features, one per argument (reads stdin when none are given)
    pub features: Vec<String>,

    /// Text file with one feature per line
    #[arg(short, long, conflicts_with = "csv")]
    pub file: Option<PathBuf>,

    /// CSV file with a "Feature" column
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Prioritization framework
    #[arg(long, value_enum, default_value = "rice")]
    pub framework: FrameworkArg,

    #[command(flatten)]
    pub completion: CompletionArgs,

    /// Export the result as CSV (defaults to the configured export filename)
    #[arg(short, long, num_args = 0..=1)]
    pub output: Option<Option<PathBuf>>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the prompt without calling the completion service
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum FrameworkArg {
    #[default]
    Rice,
}

impl From<FrameworkArg> for Framework {
    fn from(arg: FrameworkArg) -> Self {
        match arg {
            FrameworkArg::Rice => Framework::Rice,
        }
    }
}
