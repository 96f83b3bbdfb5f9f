//! Client for an OpenAI-compatible chat completion API (Groq by default).

use async_trait::async_trait;
use call_ai::http::{check_status, ServiceClient};
use call_ai::traits::coaching::Provider;
use call_ai::Error;
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Calls `POST {base_url}/chat/completions`.
pub struct GroqClient {
    client: ServiceClient,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GroqClient {
    pub fn new(client: ServiceClient, base_url: &str, model: &str, temperature: f32) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
        }
    }
}

#[async_trait]
impl Provider for GroqClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, Error> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
        };

        debug!("Requesting chat completion from {}", self.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach coaching service: {e:?}");
                Error::from(e)
            })?;

        let body: ChatCompletionResponse = check_status(response).await?.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Deserialization("chat completion had no content".to_string()))
    }

    fn provider_id(&self) -> &str {
        "groq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::http::ServiceClientBuilder;
    use mockito::{Matcher, Server};

    fn client(base_url: &str) -> GroqClient {
        let http = ServiceClientBuilder::new()
            .with_max_retries(0)
            .with_bearer_token(Some("gsk_test".to_string()))
            .build()
            .unwrap();
        GroqClient::new(http, base_url, "llama-3.1-8b-instant", 0.3)
    }

    #[tokio::test]
    async fn complete_sends_system_and_user_messages() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer gsk_test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "llama-3.1-8b-instant",
                "messages": [
                    { "role": "system", "content": "coach" },
                    { "role": "user", "content": "transcript" }
                ]
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"- Greet warmly"}}]}"#)
            .create_async()
            .await;

        let reply = client(&server.url())
            .complete("coach", "transcript")
            .await
            .unwrap();

        assert_eq!(reply, "- Greet warmly");
    }

    #[tokio::test]
    async fn complete_surfaces_rate_limits() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;

        let err = client(&server.url())
            .complete("coach", "transcript")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::RateLimited {
                retry_after_seconds: 7
            }
        ));
    }

    #[tokio::test]
    async fn complete_without_choices_is_a_deserialization_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .complete("coach", "transcript")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Deserialization(_)));
    }
}
