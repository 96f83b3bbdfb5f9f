//! Similar-call recommendations with coaching nudges.

use crate::error::Error;
use crate::providers::Providers;
use crate::Id;
use call_ai::traits::coaching;
use entity_api::{call, call_insight};
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

/// Number of similar calls returned per request.
pub const TOP_N: usize = 5;
pub const MAX_NUDGES: usize = 3;
pub const MAX_NUDGE_WORDS: usize = 40;

const COACHING_INSTRUCTION: &str = "You are a coaching assistant helping customer service agents \
improve their calls. Provide three concise nudges, each at most 40 words.";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Recommendation {
    pub call_id: Id,
    pub similarity: f64,
    /// Empty when the coaching service produced fewer nudges than there are recommendations
    pub nudge: String,
}

/// Cosine similarity of two vectors. Vectors of different length, empty
/// vectors and zero vectors are never similar (0.0).
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// The `top_n` candidates most similar to `target`, excluding `exclude_id`,
/// highest similarity first.
pub fn most_similar(
    target: &[f64],
    candidates: &[(Id, Vec<f64>)],
    exclude_id: &str,
    top_n: usize,
) -> Vec<(Id, f64)> {
    let mut similarities: Vec<(Id, f64)> = candidates
        .iter()
        .filter(|(id, _)| id != exclude_id)
        .map(|(id, embedding)| (id.clone(), cosine_similarity(target, embedding)))
        .collect();

    similarities.sort_by(|a, b| b.1.total_cmp(&a.1));
    similarities.truncate(top_n);
    similarities
}

/// Splits a model reply into at most `MAX_NUDGES` nudges, one per non-empty
/// line with leading bullet markers removed, each capped at `MAX_NUDGE_WORDS` words.
pub fn parse_nudges(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(|line| line.trim_start_matches(['-', '•', ' ']).trim())
        .filter(|line| !line.is_empty())
        .take(MAX_NUDGES)
        .map(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.len() > MAX_NUDGE_WORDS {
                words[..MAX_NUDGE_WORDS].join(" ")
            } else {
                line.to_string()
            }
        })
        .collect()
}

/// Asks the coaching model for nudges about `transcript`.
pub async fn coaching_nudges(
    provider: &dyn coaching::Provider,
    transcript: &str,
) -> Result<Vec<String>, Error> {
    let reply = provider
        .complete(
            COACHING_INSTRUCTION,
            &format!("Here is a call transcript:\n\n{transcript}"),
        )
        .await?;
    Ok(parse_nudges(&reply))
}

/// Finds the calls most similar to `call_id` and pairs them with coaching
/// nudges generated from its transcript.
///
/// Fails with not-found when the call has no insight yet. Coaching is
/// best-effort: when it fails every nudge is empty.
pub async fn recommend(
    db: &DatabaseConnection,
    providers: &Providers,
    call_id: &str,
) -> Result<Vec<Recommendation>, Error> {
    let Some(insight) = call_insight::find_by_call_id(db, call_id).await? else {
        debug!("No insight for call {call_id}");
        return Err(Error::not_found());
    };
    let target = call::find_by_id(db, call_id).await?;

    let candidates = call_insight::find_embeddings(db).await?;
    let similar = most_similar(&insight.embedding, &candidates, call_id, TOP_N);

    let nudges = match coaching_nudges(providers.coaching.as_ref(), &target.transcript).await {
        Ok(nudges) => nudges,
        Err(err) => {
            warn!("Coaching nudges unavailable for call {call_id}: {err}");
            Vec::new()
        }
    };

    let mut nudges = nudges.into_iter();
    Ok(similar
        .into_iter()
        .map(|(call_id, similarity)| Recommendation {
            call_id,
            similarity,
            nudge: nudges.next().unwrap_or_default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_mismatched_or_empty_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn most_similar_excludes_the_target_and_ranks_descending() {
        let candidates = vec![
            ("target".to_string(), vec![1.0, 0.0]),
            ("opposite".to_string(), vec![-1.0, 0.0]),
            ("close".to_string(), vec![0.9, 0.1]),
            ("orthogonal".to_string(), vec![0.0, 1.0]),
        ];

        let ranked = most_similar(&[1.0, 0.0], &candidates, "target", 2);

        let ids: Vec<&str> = ranked.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["close", "orthogonal"]);
    }

    #[test]
    fn parse_nudges_strips_bullets_and_keeps_three() {
        let reply = "- Greet the customer by name\n\n• Confirm the issue\n  - Offer a follow-up\n- Thank them";

        assert_eq!(
            parse_nudges(reply),
            vec![
                "Greet the customer by name".to_string(),
                "Confirm the issue".to_string(),
                "Offer a follow-up".to_string(),
            ]
        );
    }

    #[test]
    fn parse_nudges_caps_word_count() {
        let long = vec!["word"; MAX_NUDGE_WORDS + 10].join(" ");

        let nudges = parse_nudges(&long);

        assert_eq!(nudges[0].split_whitespace().count(), MAX_NUDGE_WORDS);
    }

    #[test]
    fn parse_nudges_of_blank_reply_is_empty() {
        assert!(parse_nudges("\n  \n-\n").is_empty());
    }
}
