//! HTTP gateway in front of an Ethereum JSON-RPC node: block and
//! transaction lookups plus ABI-driven call-data decoding and encoding.

pub mod abi;
pub mod config;
pub mod ethereum;
pub mod server;
