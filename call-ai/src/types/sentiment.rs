//! Types for sentiment classification.

use serde::{Deserialize, Serialize};

/// Top label returned by a polarity classifier, with its confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

impl Classification {
    /// Whether the label denotes negative polarity ("NEGATIVE", "negative", ...).
    pub fn is_negative(&self) -> bool {
        self.label.to_uppercase().starts_with("NEGATIVE")
    }

    /// Signed polarity: the clamped score, negated for a negative label.
    pub fn signed_score(&self) -> f64 {
        let score = self.score.clamp(0.0, 1.0);
        if self.is_negative() {
            -score
        } else {
            score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(label: &str, score: f64) -> Classification {
        Classification {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn negative_labels_flip_the_sign() {
        assert_eq!(classification("NEGATIVE", 0.9).signed_score(), -0.9);
        assert_eq!(classification("negative", 0.25).signed_score(), -0.25);
    }

    #[test]
    fn positive_labels_keep_the_sign() {
        assert_eq!(classification("POSITIVE", 0.8).signed_score(), 0.8);
    }

    #[test]
    fn scores_are_clamped_to_unit_interval() {
        assert_eq!(classification("POSITIVE", 1.7).signed_score(), 1.0);
        assert_eq!(classification("NEGATIVE", -0.2).signed_score(), 0.0);
    }
}
