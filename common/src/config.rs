use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

pub const FALLBACK_USERNAME: &str = "guest";
pub const FALLBACK_WORKGROUP: &str = "WORKGROUP";

/// Credentials handed to the transport when a server asks for them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_workgroup")]
    pub workgroup: String,
}

fn default_workgroup() -> String {
    FALLBACK_WORKGROUP.to_string()
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: FALLBACK_USERNAME.to_string(),
            password: String::new(),
            workgroup: FALLBACK_WORKGROUP.to_string(),
        }
    }
}

/// Resolves credentials on demand. The transport calls this at connect time,
/// only when the remote end requests authentication; nothing is pre-fetched.
pub trait CredentialResolver: Send + Sync {
    fn resolve(&self) -> Credentials;
}

/// Resolver backed by a JSON file (`{"username", "password", "workgroup"}`).
/// A missing or unreadable file falls back to the guest credentials.
pub struct FileResolver {
    path: PathBuf,
}

impl FileResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialResolver for FileResolver {
    fn resolve(&self) -> Credentials {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Credentials::default(),
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "invalid credentials file: {e}");
            Credentials::default()
        })
    }
}

/// Fixed credentials, mainly for tests and anonymous servers.
pub struct StaticResolver(pub Credentials);

impl CredentialResolver for StaticResolver {
    fn resolve(&self) -> Credentials {
        self.0.clone()
    }
}
