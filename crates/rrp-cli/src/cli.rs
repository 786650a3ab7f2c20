use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rrp",
    about = "Restaurant Rating Pool - ratings and details over a blob store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
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
    /// Submit a rating from a JSON file (or `-` for stdin)
    Submit(SubmitArgs),
    /// Show a restaurant's details and average rating
    Get(GetArgs),
    /// List every rating recorded for a restaurant
    Entries(EntriesArgs),
    /// Print the effective configuration
    Config,
    /// Start the RRP HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct SubmitArgs {
    pub file: String,
}

#[derive(Args)]
pub struct GetArgs {
    pub name: String,
}

#[derive(Args)]
pub struct EntriesArgs {
    pub name: String,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Override `server.bind_addr`
    #[arg(long)]
    pub bind: Option<String>,
}
