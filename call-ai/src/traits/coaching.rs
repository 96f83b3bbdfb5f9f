//! Coaching text generation provider trait.

use crate::Error;
use async_trait::async_trait;

/// Abstraction for an instruction-following chat model.
///
/// Used to turn a call transcript into short coaching suggestions. The
/// response is returned as raw text; callers parse it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run one chat completion with a system and a user message.
    async fn complete(&self, system: &str, user: &str) -> Result<String, Error>;

    /// Return unique identifier for this provider (e.g., "groq").
    fn provider_id(&self) -> &str;
}
