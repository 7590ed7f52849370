use std::fs;
use std::sync::Arc;

use sharescout_common::config::{Credentials, StaticResolver};
use sharescout_core::probe;
use sharescout_core::session::ShareSession;
use sharescout_core::transfer::{CHUNK_SIZE, ShareContext};
use tempfile::TempDir;

use crate::util::{spawn_bare_server, spawn_server};

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn probe_reports_visible_shares_and_skips_dead_ports() {
    let endpoint = spawn_server(None).unwrap();
    let ctx = ShareContext::guest();

    // port 1 has no listener; the live port must still be found
    let endpoints = probe::probe(&ctx, &endpoint.host(), &[1, endpoint.port()]);
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].port, endpoint.port());

    let mut names: Vec<&str> = endpoints[0]
        .shares
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["backup", "public"]);
}

#[test]
fn endpoint_without_visible_shares_is_suppressed() {
    let endpoint = spawn_bare_server().unwrap();
    let ctx = ShareContext::guest();
    let endpoints = probe::probe(&ctx, &endpoint.host(), &[endpoint.port()]);
    assert!(endpoints.is_empty());
}

#[test]
fn session_lists_shares_and_files() {
    let endpoint = spawn_server(None).unwrap();
    let ctx = ShareContext::guest();
    let mut session = ShareSession::new(&ctx, endpoint.host(), endpoint.port());

    assert!(session.connect());

    let mut shares: Vec<String> = session.list_shares().into_iter().map(|s| s.name).collect();
    shares.sort_unstable();
    assert_eq!(shares, ["backup", "public"]);

    let files = session.list_files("public");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "readme.txt");
    assert_eq!(files[0].size, "hello over the wire".len() as i64);
}

#[test]
fn download_roundtrips_across_chunk_boundaries() {
    let endpoint = spawn_server(None).unwrap();
    let ctx = ShareContext::guest();
    let mut session = ShareSession::new(&ctx, endpoint.host(), endpoint.port());
    let workdir = TempDir::new().unwrap();

    for size in [0, 1, CHUNK_SIZE - 1, CHUNK_SIZE, CHUNK_SIZE + 1, CHUNK_SIZE * 3 + 7] {
        let data = pattern(size);
        let remote = format!("blob_{size}.bin");
        fs::write(endpoint.root.path().join("public").join(&remote), &data).unwrap();

        let local = workdir.path().join(&remote);
        assert!(session.download("public", &remote, &local), "size {size}");
        assert_eq!(fs::read(&local).unwrap(), data, "size {size}");
    }
}

#[test]
fn upload_roundtrips_across_chunk_boundaries() {
    let endpoint = spawn_server(None).unwrap();
    let ctx = ShareContext::guest();
    let mut session = ShareSession::new(&ctx, endpoint.host(), endpoint.port());
    let workdir = TempDir::new().unwrap();

    for size in [0, 1, CHUNK_SIZE, CHUNK_SIZE * 2 + 13] {
        let data = pattern(size);
        let remote = format!("up_{size}.bin");
        let local = workdir.path().join(&remote);
        fs::write(&local, &data).unwrap();

        assert!(session.upload("public", &local, &remote), "size {size}");
        let stored = fs::read(endpoint.root.path().join("public").join(&remote)).unwrap();
        assert_eq!(stored, data, "size {size}");
    }
}

#[test]
fn missing_remote_file_creates_no_local_file() {
    let endpoint = spawn_server(None).unwrap();
    let ctx = ShareContext::guest();
    let mut session = ShareSession::new(&ctx, endpoint.host(), endpoint.port());
    let workdir = TempDir::new().unwrap();

    let local = workdir.path().join("ghost.bin");
    assert!(!session.download("public", "no-such-file", &local));
    assert!(!local.exists());
}

#[test]
fn hidden_entries_stay_hidden() {
    let endpoint = spawn_server(None).unwrap();
    let ctx = ShareContext::guest();
    let mut session = ShareSession::new(&ctx, endpoint.host(), endpoint.port());

    let files = session.list_files("public");
    assert!(files.iter().all(|f| f.name != ".hidden"));

    let shares = session.list_shares();
    assert!(shares.iter().all(|s| s.name != ".snap"));
}

#[test]
fn matching_credentials_are_accepted() {
    let creds = Credentials {
        username: "op".into(),
        password: "hunter2".into(),
        workgroup: "LAB".into(),
    };
    let endpoint = spawn_server(Some(Arc::new(StaticResolver(creds.clone())))).unwrap();
    let ctx = ShareContext::new(Arc::new(StaticResolver(creds)));
    let mut session = ShareSession::new(&ctx, endpoint.host(), endpoint.port());

    assert!(session.connect());
    assert!(!session.list_shares().is_empty());
}

#[test]
fn wrong_credentials_are_rejected() {
    let server_creds = Credentials {
        username: "op".into(),
        password: "hunter2".into(),
        workgroup: "LAB".into(),
    };
    let endpoint = spawn_server(Some(Arc::new(StaticResolver(server_creds)))).unwrap();

    // guest fallback does not match the server's credentials
    let ctx = ShareContext::guest();
    let mut session = ShareSession::new(&ctx, endpoint.host(), endpoint.port());

    assert!(!session.connect());
    assert!(session.list_shares().is_empty());
}

#[test]
fn traversal_paths_are_refused() {
    let endpoint = spawn_server(None).unwrap();
    let ctx = ShareContext::guest();
    let mut session = ShareSession::new(&ctx, endpoint.host(), endpoint.port());
    let workdir = TempDir::new().unwrap();

    let local = workdir.path().join("stolen");
    assert!(!session.download("public", "../../etc/passwd", &local));
    assert!(!local.exists());
}
