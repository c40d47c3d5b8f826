use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yonca",
    version,
    about = "Farm advisory intake wizard for the Yonca decision service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run interactive setup and write a config file
    Init,
    /// Validate config and test connections
    Check,
    /// Resolve location and current weather once
    Weather,
    /// Send one message to the advisory chat
    Chat {
        /// Message text
        message: String,

        /// Continue an existing conversation
        #[arg(short, long)]
        session: Option<String>,
    },
}
