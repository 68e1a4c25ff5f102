//! Captive DNS protocol engine: wire-format decode/encode, the per-datagram
//! responder, and the async UDP serving loop.
pub mod responder;
pub mod server;
pub mod wire;

pub use responder::DnsResponder;
pub use server::UdpServer;
