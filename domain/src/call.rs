use crate::error::Error;
use crate::{call_insights, calls, Id};
use chrono::NaiveDateTime;
use entity_api::call as CallApi;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

pub use entity_api::call::{find_by_id, CallFilter};

/// A listed call with its headline metrics.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CallSummary {
    pub call_id: Id,
    pub agent_id: String,
    pub customer_id: String,
    pub language: String,
    #[schema(value_type = String, format = DateTime)]
    pub start_time: NaiveDateTime,
    pub duration_seconds: i32,
    pub transcript: String,
    pub customer_sentiment: f64,
    pub agent_talk_ratio: f64,
}

impl From<(calls::Model, call_insights::Model)> for CallSummary {
    fn from((call, insight): (calls::Model, call_insights::Model)) -> Self {
        Self {
            call_id: call.call_id,
            agent_id: call.agent_id,
            customer_id: call.customer_id,
            language: call.language,
            start_time: call.start_time,
            duration_seconds: call.duration_seconds,
            transcript: call.transcript,
            customer_sentiment: insight.customer_sentiment,
            agent_talk_ratio: insight.agent_talk_ratio,
        }
    }
}

/// One page of calls plus the number of calls matching the filter.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CallPage {
    pub total: u64,
    pub items: Vec<CallSummary>,
}

/// A call with every metric; the metrics are null until its insight exists.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CallDetail {
    pub call_id: Id,
    pub agent_id: String,
    pub customer_id: String,
    pub language: String,
    #[schema(value_type = String, format = DateTime)]
    pub start_time: NaiveDateTime,
    pub duration_seconds: i32,
    pub transcript: String,
    pub embedding: Option<Vec<f64>>,
    pub customer_sentiment: Option<f64>,
    pub agent_talk_ratio: Option<f64>,
}

impl From<(calls::Model, Option<call_insights::Model>)> for CallDetail {
    fn from((call, insight): (calls::Model, Option<call_insights::Model>)) -> Self {
        let (embedding, customer_sentiment, agent_talk_ratio) = match insight {
            Some(insight) => (
                Some(insight.embedding),
                Some(insight.customer_sentiment),
                Some(insight.agent_talk_ratio),
            ),
            None => (None, None, None),
        };
        Self {
            call_id: call.call_id,
            agent_id: call.agent_id,
            customer_id: call.customer_id,
            language: call.language,
            start_time: call.start_time,
            duration_seconds: call.duration_seconds,
            transcript: call.transcript,
            embedding,
            customer_sentiment,
            agent_talk_ratio,
        }
    }
}

/// Lists calls that have insights, newest first.
pub async fn find_page(
    db: &DatabaseConnection,
    filter: &CallFilter,
    limit: u64,
    offset: u64,
) -> Result<CallPage, Error> {
    let (total, rows) = CallApi::find_with_insights(db, filter, limit, offset).await?;

    Ok(CallPage {
        total,
        items: rows.into_iter().map(CallSummary::from).collect(),
    })
}

pub async fn find_detail(db: &DatabaseConnection, call_id: &str) -> Result<CallDetail, Error> {
    Ok(CallApi::find_by_id_with_insight(db, call_id).await?.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> calls::Model {
        calls::Model {
            call_id: "2".to_string(),
            agent_id: "A".to_string(),
            customer_id: "C".to_string(),
            language: "en".to_string(),
            start_time: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            duration_seconds: 30,
            transcript: "Customer (C): hi\nAgent (A): hello".to_string(),
        }
    }

    #[test]
    fn detail_without_insight_has_null_metrics() {
        let detail = CallDetail::from((call(), None));

        assert_eq!(detail.call_id, "2");
        assert_eq!(detail.embedding, None);
        assert_eq!(detail.customer_sentiment, None);

        let json = serde_json::to_value(&detail).unwrap();
        assert!(json["agent_talk_ratio"].is_null());
    }

    #[test]
    fn summary_carries_the_headline_metrics() {
        let insight = call_insights::Model {
            call_id: "2".to_string(),
            embedding: vec![0.1, 0.2],
            customer_sentiment: -0.4,
            agent_talk_ratio: 0.5,
        };

        let summary = CallSummary::from((call(), insight));

        assert_eq!(summary.customer_sentiment, -0.4);
        assert_eq!(summary.agent_talk_ratio, 0.5);
        assert_eq!(summary.start_time.to_string(), "2024-01-01 10:00:00");
    }
}
