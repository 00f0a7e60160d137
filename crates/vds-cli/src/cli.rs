use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vds_types::ObjectId;

#[derive(Parser)]
#[command(name = "vds", about = "Versioned document store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository directory (default: the config file's `repo_path`, else `.`)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository
    Init,
    /// Print a document
    Cat(CatArgs),
    /// List a directory
    Ls(LsArgs),
    /// Show the commits that changed a path
    Log(LogArgs),
    /// Write a document
    Put(PutArgs),
    /// Serve the repository over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct CatArgs {
    pub path: String,
    /// Read at this commit instead of HEAD
    #[arg(long)]
    pub at: Option<ObjectId>,
}

#[derive(Args)]
pub struct LsArgs {
    #[arg(default_value = "/")]
    pub path: String,
    #[arg(long)]
    pub at: Option<ObjectId>,
}

#[derive(Args)]
pub struct LogArgs {
    pub path: String,
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    #[arg(long)]
    pub at: Option<ObjectId>,
}

#[derive(Args)]
pub struct PutArgs {
    pub path: String,
    /// File to read the content from, `-` for stdin
    pub file: String,
    #[arg(short, long)]
    pub message: Option<String>,
    /// Id of the blob this write replaces
    #[arg(long, conflicts_with_all = ["expect_absent", "force"])]
    pub expect: Option<ObjectId>,
    /// Fail unless the path does not exist yet (the default)
    #[arg(long, conflicts_with = "force")]
    pub expect_absent: bool,
    /// Overwrite whatever the path holds
    #[arg(long)]
    pub force: bool,
    #[arg(long)]
    pub author_name: Option<String>,
    #[arg(long)]
    pub author_email: Option<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Allow cross-origin requests
    #[arg(long)]
    pub cors: bool,
}
