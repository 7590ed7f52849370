use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use sharescout_common::config::CredentialResolver;
use sharescout_core::server::ShareServer;
use tempfile::TempDir;

/// A share server bound to an ephemeral loopback port. The temp root is
/// dropped with the endpoint; the server thread dies with the process.
pub struct TestEndpoint {
    pub addr: SocketAddr,
    pub root: TempDir,
}

impl TestEndpoint {
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Spawns a server over a fresh root with two visible shares (`public`,
/// containing `readme.txt` and a hidden file, and an empty `backup`) plus
/// a hidden `.snap` directory.
pub fn spawn_server(
    resolver: Option<Arc<dyn CredentialResolver>>,
) -> anyhow::Result<TestEndpoint> {
    let root = TempDir::new()?;
    let public = root.path().join("public");
    fs::create_dir(&public)?;
    fs::write(public.join("readme.txt"), b"hello over the wire")?;
    fs::write(public.join(".hidden"), b"not listed")?;
    fs::create_dir(root.path().join("backup"))?;
    fs::create_dir(root.path().join(".snap"))?;

    let server = ShareServer::bind("127.0.0.1:0", root.path(), resolver)?;
    let addr = server.local_addr()?;
    thread::spawn(move || server.run());
    Ok(TestEndpoint { addr, root })
}

/// Same, but over a root whose only entries are hidden.
pub fn spawn_bare_server() -> anyhow::Result<TestEndpoint> {
    let root = TempDir::new()?;
    fs::create_dir(root.path().join(".trash"))?;

    let server = ShareServer::bind("127.0.0.1:0", root.path(), None)?;
    let addr = server.local_addr()?;
    thread::spawn(move || server.run());
    Ok(TestEndpoint { addr, root })
}
