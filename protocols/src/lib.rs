pub mod arp;
pub mod dnssd;
pub mod wire;
