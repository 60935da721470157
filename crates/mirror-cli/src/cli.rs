//! Command-line definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mirror",
    version,
    about = "Reconcile a local tree against a remote repository snapshot"
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API token for authenticated requests
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Response cache directory
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Cache time-to-live in seconds
    #[arg(long, global = true, default_value_t = 3600)]
    pub ttl: u64,

    /// Disable the response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Download files via the API instead of the raw-content host
    #[arg(long, global = true)]
    pub api_download: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every remote entry against local state, counting only
    Status {
        /// "user/repo" reference
        reference: String,
        /// Local tree root
        #[arg(short, long)]
        local: PathBuf,
        /// Branch (defaults to the remote's default branch)
        #[arg(short, long)]
        branch: Option<String>,
    },
    /// Download missing files and create missing directories
    Pull {
        /// "user/repo" reference
        reference: String,
        /// Local tree root
        #[arg(short, long)]
        local: PathBuf,
        /// Branch (defaults to the remote's default branch)
        #[arg(short, long)]
        branch: Option<String>,
        /// Also delete and re-download conflicting local files
        #[arg(long)]
        overwrite: bool,
    },
    /// List a user's repositories
    Repos {
        user: String,
        /// Fetch a single page instead of the whole listing
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show repository metadata
    Info {
        /// "user/repo" reference
        reference: String,
    },
    /// List branch heads
    Branches {
        /// "user/repo" reference
        reference: String,
    },
}
