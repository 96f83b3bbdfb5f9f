//! Call analytics domain: turning raw support messages into calls, enriching
//! them with ML metrics, and answering queries over the result.
//!
//! The `web` layer and the command line programs only talk to this crate. The
//! entity types are re-exported here so that consumers of `domain` do not need
//! to depend on `entity_api` directly.

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{call_insights, calls, Id};

pub mod analytics;
pub mod archive;
pub mod call;
pub mod call_builder;
pub mod error;
pub mod ingest;
pub mod message;
pub mod metrics;
pub mod providers;
pub mod recommendation;
pub mod thread;

pub mod gateway;
