pub mod probe;
pub mod registry;
pub mod scanner;
pub mod server;
pub mod session;
pub mod transfer;
