pub mod discover;
pub mod serve;
pub mod transfer;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sharescout")]
#[command(about = "Discover hosts and file shares on the local network.")]
pub struct CommandLine {
    /// Increase log detail (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Credentials file consulted when a server requires authentication
    #[arg(long, default_value = "config.json", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover hosts and advertised services on the LAN
    #[command(alias = "d")]
    Discover {
        /// Length of the discovery window in milliseconds
        #[arg(long, default_value_t = 1000)]
        timeout_ms: u64,
        /// Capture interface; picked automatically when omitted
        #[arg(short, long)]
        interface: Option<String>,
        /// Known hosts to probe directly, skipping the discovery scan
        #[arg(long = "seed")]
        seeds: Vec<String>,
    },
    /// Probe a host's candidate ports for share endpoints
    #[command(alias = "p")]
    Probe {
        host: String,
        /// Ports to try instead of the default candidate set
        #[arg(short, long)]
        ports: Vec<u16>,
    },
    /// List the shares a single endpoint exposes
    Shares {
        host: String,
        #[arg(short = 'P', long, default_value_t = 445)]
        port: u16,
    },
    /// List the files at the top level of a share
    Ls {
        host: String,
        share: String,
        #[arg(short = 'P', long, default_value_t = 445)]
        port: u16,
    },
    /// Download a file from a share
    Get {
        host: String,
        share: String,
        remote: String,
        local: PathBuf,
        #[arg(short = 'P', long, default_value_t = 445)]
        port: u16,
    },
    /// Upload a file into a share
    Put {
        host: String,
        share: String,
        local: PathBuf,
        remote: String,
        #[arg(short = 'P', long, default_value_t = 445)]
        port: u16,
    },
    /// Serve the subdirectories of a root directory as shares
    Serve {
        root: PathBuf,
        #[arg(short = 'P', long, default_value_t = 445)]
        port: u16,
        /// Skip the authentication challenge entirely
        #[arg(long)]
        anonymous: bool,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
