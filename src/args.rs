use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::filter::{LinkType, SortKey};

#[derive(Parser, Debug)]
#[command(
    name = "backlink-checker",
    about = "Analyze the backlinks of a domain using the SE Ranking API",
    version,
    long_about = None
)]
pub struct Args {
    /// Path to a TOML config file (default: ./backlink_checker.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch and summarize the backlinks of a domain
    Check(CheckArgs),
    /// Run the web interface
    Serve(ServeArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CheckArgs {
    /// Domain to analyze (e.g. example.com)
    pub domain: String,

    /// Number of backlinks to request (default: cli_limit from config)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Number of backlinks to list
    #[arg(short, long, default_value_t = 10)]
    pub top: usize,

    /// Only list backlinks of this type
    #[arg(long = "type", value_enum, default_value_t = LinkType::All)]
    pub link_type: LinkType,

    /// Only list backlinks whose anchor, title or source URL matches (case-insensitive regex)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Order of the listed backlinks
    #[arg(long, value_enum, default_value_t = SortKey::Position)]
    pub sort: SortKey,

    /// Print the full summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Analyze a saved API response instead of calling the API
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ServeArgs {
    /// Address to bind (default: server_host from config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (default: server_port from config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Args {
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Check(check) => {
                if check.domain.trim().is_empty() {
                    anyhow::bail!("domain must not be empty");
                }
                if let Some(limit) = check.limit {
                    if limit == 0 {
                        anyhow::bail!("--limit must be greater than 0");
                    }
                }
                if check.top == 0 {
                    anyhow::bail!("--top must be greater than 0");
                }
            }
            Command::Serve(serve) => {
                if serve.port == Some(0) {
                    anyhow::bail!("--port must be greater than 0");
                }
            }
        }
        Ok(())
    }
}
