pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "garden-aggregator")]
#[command(about = "Fetch, normalize and cache garden weather, stock and item data")]
pub struct Cli {
    /// Path to a TOML configuration file; built-in defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Current weather object embedded in the weather page
    Weather,
    /// Item catalog, optionally filtered
    Catalog {
        #[arg(long, alias = "filter")]
        category: Option<String>,
        #[arg(long)]
        rarity: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Combined main and special stock
    Stock,
    /// Validate a valuation query, e.g. "Name=Apple&Weight=2.5&Mutation=Wet"
    Price {
        #[arg(long)]
        query: String,
    },
}
