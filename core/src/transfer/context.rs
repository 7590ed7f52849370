use std::sync::Arc;

use sharescout_common::config::{CredentialResolver, Credentials, StaticResolver};

/// Explicit replacement for a process-global protocol handle: constructed
/// once at startup and passed by reference into every session and probe.
pub struct ShareContext {
    resolver: Arc<dyn CredentialResolver>,
}

impl ShareContext {
    pub fn new(resolver: Arc<dyn CredentialResolver>) -> Self {
        Self { resolver }
    }

    /// Context carrying the guest fallback credentials.
    pub fn guest() -> Self {
        Self::new(Arc::new(StaticResolver(Credentials::default())))
    }

    /// Invoked by the transport when, and only when, a server asks for
    /// authentication.
    pub fn resolve_credentials(&self) -> Credentials {
        self.resolver.resolve()
    }
}
