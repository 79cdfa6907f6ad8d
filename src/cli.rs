// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Flags fall back to the environment variables a scheduled job sets.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tagtrim")]
#[command(about = "Delete old image tags from a Docker Hub repository by count and size")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a tagtrim.yml file (default: discovered in the current directory)
    #[arg(short, long, global = true, env = "TAGTRIM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new tagtrim.yml configuration file
    Init {
        /// Repository as namespace/name
        #[arg(short, long)]
        repository: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Apply the retention policy, deleting tags that exceed it
    Run {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        retention: RetentionArgs,

        /// Report what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List every tag in the repository, newest first
    List {
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// Repository as namespace/name, or a name under the username's namespace
    #[arg(long, env = "DOCKER_REPOSITORY")]
    pub repository: Option<String>,

    /// Registry account name
    #[arg(long, env = "DOCKER_USERNAME")]
    pub username: Option<String>,

    /// Registry account password or access token
    #[arg(long, env = "DOCKER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Registry API base URL
    #[arg(long, env = "TAGTRIM_REGISTRY_URL")]
    pub registry_url: Option<String>,
}

#[derive(Args)]
pub struct RetentionArgs {
    /// Keep at most this many of the most recently updated tags
    #[arg(long, env = "KEEP_COUNT", allow_hyphen_values = true)]
    pub keep_count: Option<String>,

    /// Delete oldest tags until the total size is at most this many MB
    #[arg(long, env = "MAX_SIZE_MB", allow_hyphen_values = true)]
    pub max_size_mb: Option<String>,

    /// File listing tags that must never be deleted, one per line
    #[arg(long, env = "SKIP_TAGS_FILE")]
    pub skip_tags_file: Option<PathBuf>,
}
