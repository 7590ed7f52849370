mod commands;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use commands::{CommandLine, Commands, discover, serve, transfer};
use sharescout_common::config::FileResolver;
use sharescout_core::transfer::ShareContext;

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    terminal::logging::init(commands.verbose);

    let ctx = ShareContext::new(Arc::new(FileResolver::new(PathBuf::from(
        &commands.config,
    ))));

    match commands.command {
        Commands::Discover {
            timeout_ms,
            interface,
            seeds,
        } => discover::discover(&ctx, timeout_ms, interface, seeds),
        Commands::Probe { host, ports } => transfer::probe(&ctx, &host, ports),
        Commands::Shares { host, port } => transfer::shares(&ctx, &host, port),
        Commands::Ls { host, share, port } => transfer::ls(&ctx, &host, port, &share),
        Commands::Get {
            host,
            share,
            remote,
            local,
            port,
        } => transfer::get(&ctx, &host, port, &share, &remote, &local),
        Commands::Put {
            host,
            share,
            local,
            remote,
            port,
        } => transfer::put(&ctx, &host, port, &share, &local, &remote),
        Commands::Serve {
            root,
            port,
            anonymous,
        } => serve::serve(root, port, anonymous, &commands.config),
    }
}
