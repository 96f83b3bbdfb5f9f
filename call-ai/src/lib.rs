//! ML service abstraction layer for call enrichment.
//!
//! This crate provides trait-based abstractions for the three external models
//! the platform depends on:
//! - Sentence embedding of transcript segments
//! - Polarity classification of transcript text
//! - LLM chat completion for coaching suggestions
//!
//! Implementations live with the application; this crate only fixes the
//! contracts, the shared error type, and the retrying HTTP client every
//! implementation is expected to use.

pub mod error;
pub mod http;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::sentiment::Classification;
