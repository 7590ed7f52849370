use std::path::PathBuf;
use std::sync::Arc;

use sharescout_common::config::{CredentialResolver, FileResolver};
use sharescout_core::server::ShareServer;

pub fn serve(root: PathBuf, port: u16, anonymous: bool, config: &str) -> anyhow::Result<()> {
    let resolver: Option<Arc<dyn CredentialResolver>> = if anonymous {
        None
    } else {
        Some(Arc::new(FileResolver::new(PathBuf::from(config))))
    };

    let server = ShareServer::bind(("0.0.0.0", port), root, resolver)?;
    server.run();
    Ok(())
}
