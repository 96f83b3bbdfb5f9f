//! Sentence embedding provider trait.

use crate::Error;
use async_trait::async_trait;

/// Abstraction for a sentence embedding model.
///
/// Implementations return one fixed-dimension vector per input, in input order.
/// The platform averages the vectors of a call's utterances, so every vector a
/// provider returns must share the same dimension.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Embed each input string. An empty slice yields an empty result.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f64>>, Error>;

    /// Return unique identifier for this provider (e.g., "tei").
    fn provider_id(&self) -> &str;
}
