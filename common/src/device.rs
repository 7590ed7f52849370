use std::fmt;

/// Which discovery path produced a record.
///
/// The two paths observe different identities: link-layer capture sees
/// addresses, service browsing sees advertised names. A single physical
/// device seen by both paths yields two records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverySource {
    LinkLayer,
    ServiceDiscovery,
}

impl DiscoverySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoverySource::LinkLayer => "link-layer",
            DiscoverySource::ServiceDiscovery => "service-discovery",
        }
    }
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered device, as merged into the registry.
///
/// Fields not known to the producing path are left empty: a link-layer
/// record has no name or service type, a service record has no address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub ip: String,
    pub mac: String,
    pub name: String,
    pub service_type: String,
    pub source: DiscoverySource,
}

impl DeviceRecord {
    pub fn from_link_layer(ip: impl Into<String>, mac: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            mac: mac.into(),
            name: String::new(),
            service_type: String::new(),
            source: DiscoverySource::LinkLayer,
        }
    }

    pub fn from_service(name: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            ip: String::new(),
            mac: String::new(),
            name: name.into(),
            service_type: service_type.into(),
            source: DiscoverySource::ServiceDiscovery,
        }
    }

    pub fn source_hint(&self) -> &'static str {
        self.source.as_str()
    }
}
