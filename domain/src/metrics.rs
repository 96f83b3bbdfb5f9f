//! Metric extraction over a call transcript.

use crate::call_insights;
use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use crate::providers::Providers;
use call_ai::traits::{embedding, sentiment};
use log::*;
use once_cell::sync::Lazy;
use regex::Regex;

/// Characters of transcript sent to the sentiment classifier.
pub const SENTIMENT_INPUT_CHARS: usize = 512;

const FILLER_WORDS: &[&str] = &["um", "uh", "ah", "like", "hmm"];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

/// Mean sentence embedding of `transcript`.
///
/// Sentences are the non-empty, trimmed pieces between periods. When there are
/// none the service is not called and the vector is empty.
pub async fn embedding(
    provider: &dyn embedding::Provider,
    transcript: &str,
) -> Result<Vec<f64>, Error> {
    let sentences: Vec<String> = transcript
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if sentences.is_empty() {
        return Ok(Vec::new());
    }

    let vectors = provider.embed(&sentences).await?;
    if vectors.len() != sentences.len() {
        return Err(invalid_embedding(format!(
            "expected {} vectors, got {}",
            sentences.len(),
            vectors.len()
        )));
    }

    mean(&vectors)
}

fn mean(vectors: &[Vec<f64>]) -> Result<Vec<f64>, Error> {
    let dimension = vectors.first().map(Vec::len).unwrap_or_default();
    let mut sum = vec![0.0; dimension];
    for vector in vectors {
        if vector.len() != dimension {
            return Err(invalid_embedding(format!(
                "mixed dimensions {} and {}",
                dimension,
                vector.len()
            )));
        }
        for (total, value) in sum.iter_mut().zip(vector) {
            *total += value;
        }
    }

    let count = vectors.len() as f64;
    Ok(sum.into_iter().map(|total| total / count).collect())
}

fn invalid_embedding(detail: String) -> Error {
    warn!("Embedding service returned an unusable response: {detail}");
    Error {
        source: None,
        error_kind: DomainErrorKind::External(ExternalErrorKind::Other(detail)),
    }
}

/// Signed sentiment in `[-1, 1]` of the first `SENTIMENT_INPUT_CHARS` characters.
pub async fn customer_sentiment(
    provider: &dyn sentiment::Provider,
    transcript: &str,
) -> Result<f64, Error> {
    let snippet: String = transcript.chars().take(SENTIMENT_INPUT_CHARS).collect();
    let classification = provider.classify(&snippet).await?;
    Ok(classification.signed_score())
}

/// Share of non-filler words spoken on `Agent` lines, or 0.0 for a transcript without words.
pub fn agent_talk_ratio(transcript: &str) -> f64 {
    let mut total_words = 0usize;
    let mut agent_words = 0usize;

    for line in transcript.split('\n') {
        let lowered = line.to_lowercase();
        let words = WORD
            .find_iter(&lowered)
            .filter(|word| !FILLER_WORDS.contains(&word.as_str()))
            .count();

        total_words += words;
        if line.starts_with("Agent") {
            agent_words += words;
        }
    }

    if total_words == 0 {
        return 0.0;
    }
    agent_words as f64 / total_words as f64
}

/// Computes every metric of `call_id`'s transcript into an insight row.
pub async fn extract(
    providers: &Providers,
    call_id: &str,
    transcript: &str,
) -> Result<call_insights::Model, Error> {
    let embedding = embedding(providers.embedding.as_ref(), transcript).await?;
    let customer_sentiment = customer_sentiment(providers.sentiment.as_ref(), transcript).await?;
    let agent_talk_ratio = agent_talk_ratio(transcript);

    debug!(
        "Metrics for call {call_id}: dim={}, sentiment={customer_sentiment:.3}, talk_ratio={agent_talk_ratio:.3}",
        embedding.len()
    );

    Ok(call_insights::Model {
        call_id: call_id.to_string(),
        embedding,
        customer_sentiment,
        agent_talk_ratio,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use call_ai::{traits::coaching, Classification};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Returns `[len, 1.0]` for every input and records what it was asked.
    #[derive(Default)]
    pub(crate) struct FakeEmbedding {
        pub(crate) calls: AtomicUsize,
        pub(crate) inputs: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl embedding::Provider for FakeEmbedding {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f64>>, call_ai::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inputs.lock().unwrap().extend(inputs.iter().cloned());
            Ok(inputs.iter().map(|s| vec![s.len() as f64, 1.0]).collect())
        }

        fn provider_id(&self) -> &str {
            "fake"
        }
    }

    pub(crate) struct FakeSentiment {
        pub(crate) result: Result<Classification, ()>,
        pub(crate) inputs: Mutex<Vec<String>>,
    }

    impl FakeSentiment {
        pub(crate) fn returning(label: &str, score: f64) -> Self {
            Self {
                result: Ok(Classification {
                    label: label.to_string(),
                    score,
                }),
                inputs: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                result: Err(()),
                inputs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl sentiment::Provider for FakeSentiment {
        async fn classify(&self, text: &str) -> Result<Classification, call_ai::Error> {
            self.inputs.lock().unwrap().push(text.to_string());
            self.result
                .clone()
                .map_err(|_| call_ai::Error::Network("connection reset".to_string()))
        }

        fn provider_id(&self) -> &str {
            "fake"
        }
    }

    pub(crate) struct FakeCoaching {
        pub(crate) reply: Option<String>,
    }

    #[async_trait]
    impl coaching::Provider for FakeCoaching {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, call_ai::Error> {
            self.reply
                .clone()
                .ok_or_else(|| call_ai::Error::Provider("400: bad request".to_string()))
        }

        fn provider_id(&self) -> &str {
            "fake"
        }
    }

    pub(crate) fn providers(sentiment: FakeSentiment, coaching_reply: Option<&str>) -> Providers {
        Providers::new(
            Arc::new(FakeEmbedding::default()),
            Arc::new(sentiment),
            Arc::new(FakeCoaching {
                reply: coaching_reply.map(str::to_string),
            }),
        )
    }

    #[tokio::test]
    async fn embedding_averages_sentence_vectors() {
        let provider = FakeEmbedding::default();

        let vector = embedding(&provider, "Hi. Hello there.  . ").await.unwrap();

        assert_eq!(
            *provider.inputs.lock().unwrap(),
            vec!["Hi".to_string(), "Hello there".to_string()]
        );
        assert_eq!(vector, vec![6.5, 1.0]);
    }

    #[tokio::test]
    async fn embedding_without_sentences_skips_the_service() {
        let provider = FakeEmbedding::default();

        let vector = embedding(&provider, " . .. ").await.unwrap();

        assert!(vector.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn mean_rejects_mixed_dimensions() {
        assert!(mean(&[vec![1.0, 2.0], vec![1.0]]).is_err());
    }

    #[tokio::test]
    async fn negative_label_yields_negative_sentiment() {
        let provider = FakeSentiment::returning("NEGATIVE", 0.92);

        let score = customer_sentiment(&provider, "Customer (C): this is awful")
            .await
            .unwrap();

        assert_eq!(score, -0.92);
    }

    #[tokio::test]
    async fn sentiment_input_is_truncated() {
        let provider = FakeSentiment::returning("POSITIVE", 0.5);
        let transcript = "é".repeat(SENTIMENT_INPUT_CHARS + 100);

        let score = customer_sentiment(&provider, &transcript).await.unwrap();

        assert!((-1.0..=1.0).contains(&score));
        let inputs = provider.inputs.lock().unwrap();
        assert_eq!(inputs[0].chars().count(), SENTIMENT_INPUT_CHARS);
    }

    #[test]
    fn talk_ratio_of_empty_transcript_is_zero() {
        assert_eq!(agent_talk_ratio(""), 0.0);
    }

    #[test]
    fn talk_ratio_of_only_fillers_is_zero() {
        assert_eq!(agent_talk_ratio("um uh\nhmm like ah"), 0.0);
    }

    #[test]
    fn talk_ratio_counts_agent_words() {
        // agent: "agent", "a", "hello", "there" / customer: "customer", "c", "hi"
        let ratio = agent_talk_ratio("Customer (C): um hi\nAgent (A): hello there");
        assert!((ratio - 4.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn talk_ratio_stays_in_unit_interval() {
        for transcript in [
            "Agent (A): yes",
            "Customer (C): no",
            "Agent (A): like\nCustomer (C): like",
            "random words without labels",
        ] {
            let ratio = agent_talk_ratio(transcript);
            assert!((0.0..=1.0).contains(&ratio), "{transcript}: {ratio}");
        }
    }

    #[tokio::test]
    async fn extract_combines_all_metrics() {
        let providers = providers(FakeSentiment::returning("POSITIVE", 0.75), None);

        let insight = extract(&providers, "2", "Customer (C): hi\nAgent (A): hello")
            .await
            .unwrap();

        assert_eq!(insight.call_id, "2");
        assert_eq!(insight.embedding.len(), 2);
        assert_eq!(insight.customer_sentiment, 0.75);
        assert!((insight.agent_talk_ratio - 3.0 / 6.0).abs() < 1e-12);
    }
}
