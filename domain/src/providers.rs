//! The ML service clients, constructed once at start-up and shared.

use crate::error::Error;
use crate::gateway::{
    groq::GroqClient, hugging_face::HuggingFaceClient, text_embeddings::TextEmbeddingsClient,
};
use call_ai::http::ServiceClientBuilder;
use call_ai::traits::{coaching, embedding, sentiment};
use log::*;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Providers {
    pub embedding: Arc<dyn embedding::Provider>,
    pub sentiment: Arc<dyn sentiment::Provider>,
    pub coaching: Arc<dyn coaching::Provider>,
}

impl Providers {
    pub fn new(
        embedding: Arc<dyn embedding::Provider>,
        sentiment: Arc<dyn sentiment::Provider>,
        coaching: Arc<dyn coaching::Provider>,
    ) -> Self {
        Self {
            embedding,
            sentiment,
            coaching,
        }
    }

    /// Builds the HTTP-backed providers described by `config`. Every client
    /// shares the configured timeout and retry budget.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let http = |api_key: Option<String>| {
            ServiceClientBuilder::new()
                .with_timeout(Duration::from_secs(config.ml_request_timeout_secs))
                .with_max_retries(config.ml_max_retries)
                .with_bearer_token(api_key)
                .build()
        };

        if config.coaching_api_key().is_none() {
            warn!("COACHING_API_KEY is not set; coaching nudges will fail");
        }

        let providers = Self::new(
            Arc::new(TextEmbeddingsClient::new(
                http(config.embedding_api_key())?,
                config.embedding_service_url(),
            )),
            Arc::new(HuggingFaceClient::new(
                http(config.sentiment_api_key())?,
                config.sentiment_service_url(),
            )),
            Arc::new(GroqClient::new(
                http(config.coaching_api_key())?,
                config.coaching_base_url(),
                config.coaching_model(),
                config.coaching_temperature,
            )),
        );

        info!(
            "ML providers: embedding={}, sentiment={}, coaching={}",
            providers.embedding.provider_id(),
            providers.sentiment.provider_id(),
            providers.coaching.provider_id()
        );
        Ok(providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn from_config_wires_the_http_providers() {
        let config = Config::parse_from(["call_analytics_rs", "--coaching-api-key", "gsk_test"]);

        let providers = Providers::from_config(&config).unwrap();

        assert_eq!(providers.embedding.provider_id(), "tei");
        assert_eq!(providers.sentiment.provider_id(), "huggingface");
        assert_eq!(providers.coaching.provider_id(), "groq");
    }
}
