//! Client for a Hugging Face hosted text classification pipeline.

use async_trait::async_trait;
use call_ai::http::{check_status, ServiceClient};
use call_ai::traits::sentiment::Provider;
use call_ai::{Classification, Error};
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

/// The hosted pipeline answers `[[{label, score}, ..]]` for a single input;
/// self-hosted deployments often answer the flat `[{label, score}, ..]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<Classification>>),
    Flat(Vec<Classification>),
}

impl ClassifyResponse {
    fn top(self) -> Option<Classification> {
        let candidates = match self {
            ClassifyResponse::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            ClassifyResponse::Flat(candidates) => candidates,
        };
        candidates
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

/// Calls `POST {model_url}` with one text.
pub struct HuggingFaceClient {
    client: ServiceClient,
    model_url: String,
}

impl HuggingFaceClient {
    pub fn new(client: ServiceClient, model_url: &str) -> Self {
        Self {
            client,
            model_url: model_url.to_string(),
        }
    }
}

#[async_trait]
impl Provider for HuggingFaceClient {
    async fn classify(&self, text: &str) -> Result<Classification, Error> {
        let response = self
            .client
            .post(&self.model_url)
            .json(&ClassifyRequest { inputs: text })
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach sentiment service: {e:?}");
                Error::from(e)
            })?;

        let body: ClassifyResponse = check_status(response).await?.json().await?;
        body.top()
            .ok_or_else(|| Error::Deserialization("sentiment response had no labels".to_string()))
    }

    fn provider_id(&self) -> &str {
        "huggingface"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::http::ServiceClientBuilder;
    use mockito::{Matcher, Server};

    fn client(url: &str) -> HuggingFaceClient {
        let http = ServiceClientBuilder::new()
            .with_max_retries(0)
            .with_bearer_token(Some("hf_test".to_string()))
            .build()
            .unwrap();
        HuggingFaceClient::new(http, url)
    }

    #[tokio::test]
    async fn classify_picks_the_highest_scoring_label() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/sst-2")
            .match_header("authorization", "Bearer hf_test")
            .match_body(Matcher::Json(serde_json::json!({ "inputs": "I am furious" })))
            .with_status(200)
            .with_body(
                r#"[[{"label":"NEGATIVE","score":0.97},{"label":"POSITIVE","score":0.03}]]"#,
            )
            .create_async()
            .await;

        let classification = client(&format!("{}/models/sst-2", server.url()))
            .classify("I am furious")
            .await
            .unwrap();

        assert_eq!(classification.label, "NEGATIVE");
        assert_eq!(classification.score, 0.97);
    }

    #[tokio::test]
    async fn classify_accepts_a_flat_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"[{"label":"POSITIVE","score":0.88}]"#)
            .create_async()
            .await;

        let classification = client(&server.url()).classify("thanks!").await.unwrap();

        assert_eq!(classification.signed_score(), 0.88);
    }

    #[tokio::test]
    async fn classify_reports_rejected_credentials() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(401)
            .with_body("Invalid credentials")
            .create_async()
            .await;

        let err = client(&server.url()).classify("hello").await.unwrap_err();

        assert!(matches!(err, Error::Authentication(_)));
    }
}
