//! Sentiment classification provider trait.

use crate::types::sentiment::Classification;
use crate::Error;
use async_trait::async_trait;

/// Abstraction for a binary polarity classifier.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Classify `text` and return the top label with its confidence.
    ///
    /// Callers are responsible for truncating input to the model's limit.
    async fn classify(&self, text: &str) -> Result<Classification, Error>;

    /// Return unique identifier for this provider (e.g., "huggingface").
    fn provider_id(&self) -> &str;
}
