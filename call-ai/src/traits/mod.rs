//! Provider traits implemented by the application's ML gateways.

pub mod coaching;
pub mod embedding;
pub mod sentiment;
