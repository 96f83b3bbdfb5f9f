//! Client for a text-embeddings-inference compatible sentence embedding service.

use async_trait::async_trait;
use call_ai::http::{check_status, ServiceClient};
use call_ai::traits::embedding::Provider;
use call_ai::Error;
use log::*;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

/// Calls `POST {base_url}/embed` with a batch of sentences.
pub struct TextEmbeddingsClient {
    client: ServiceClient,
    base_url: String,
}

impl TextEmbeddingsClient {
    pub fn new(client: ServiceClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Provider for TextEmbeddingsClient {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f64>>, Error> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embed", self.base_url);
        debug!("Embedding {} sentences", inputs.len());

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { inputs })
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach embedding service: {e:?}");
                Error::from(e)
            })?;

        let vectors: Vec<Vec<f64>> = check_status(response).await?.json().await?;
        Ok(vectors)
    }

    fn provider_id(&self) -> &str {
        "tei"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::http::ServiceClientBuilder;
    use mockito::{Matcher, Server};

    fn client(base_url: &str) -> TextEmbeddingsClient {
        let http = ServiceClientBuilder::new().with_max_retries(0).build().unwrap();
        TextEmbeddingsClient::new(http, base_url)
    }

    #[tokio::test]
    async fn embed_posts_inputs_and_returns_vectors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/embed")
            .match_body(Matcher::Json(serde_json::json!({
                "inputs": ["Customer (C): hi", "Agent (A): hello"]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[[0.1, 0.2], [0.3, 0.4]]")
            .create_async()
            .await;

        let vectors = client(&server.url())
            .embed(&["Customer (C): hi".to_string(), "Agent (A): hello".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn embed_maps_server_errors_to_network() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/embed")
            .with_status(503)
            .with_body("model loading")
            .create_async()
            .await;

        let err = client(&server.url())
            .embed(&["hello".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn embed_of_nothing_skips_the_request() {
        let vectors = client("http://127.0.0.1:9").embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
