use chrono::{DateTime, NaiveDate, NaiveDateTime};
use domain::call::CallFilter;
use domain::message::RawMessage;
use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};

use crate::Error;

pub(crate) const DEFAULT_LIMIT: u64 = 10;
pub(crate) const MAX_LIMIT: u64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    /// Page size, 1 to 100 (default 10)
    pub(crate) limit: Option<u64>,
    /// Number of calls to skip (default 0)
    pub(crate) offset: Option<u64>,
    pub(crate) agent_id: Option<String>,
    /// Inclusive lower bound on the call start time. A date, a naive
    /// datetime or an RFC 3339 timestamp (converted to UTC)
    #[serde(default, deserialize_with = "deserialize_query_datetime")]
    #[param(value_type = Option<String>, format = DateTime)]
    pub(crate) from_date: Option<NaiveDateTime>,
    /// Inclusive upper bound on the call start time, same formats as `from_date`
    #[serde(default, deserialize_with = "deserialize_query_datetime")]
    #[param(value_type = Option<String>, format = DateTime)]
    pub(crate) to_date: Option<NaiveDateTime>,
    /// Minimum customer sentiment, -1.0 to 1.0
    pub(crate) min_sentiment: Option<f64>,
    /// Maximum customer sentiment, -1.0 to 1.0
    pub(crate) max_sentiment: Option<f64>,
}

impl IndexParams {
    pub(crate) fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub(crate) fn offset(&self) -> u64 {
        self.offset.unwrap_or_default()
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !(1..=MAX_LIMIT).contains(&self.limit()) {
            return Err(Error::invalid_params(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        for (name, value) in [
            ("min_sentiment", self.min_sentiment),
            ("max_sentiment", self.max_sentiment),
        ] {
            if let Some(value) = value {
                if !(-1.0..=1.0).contains(&value) {
                    return Err(Error::invalid_params(format!(
                        "{name} must be between -1.0 and 1.0"
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn filter(&self) -> CallFilter {
        CallFilter {
            agent_id: self.agent_id.clone(),
            from_date: self.from_date,
            to_date: self.to_date,
            min_sentiment: self.min_sentiment,
            max_sentiment: self.max_sentiment,
        }
    }
}

/// A bare date means midnight.
fn parse_query_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn deserialize_query_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => parse_query_datetime(&value).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid date or datetime: {value}"))
        }),
    }
}

/// Messages to reconstruct into threads and store one call at a time.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ThreadsRequest {
    pub messages: Vec<RawMessage>,
}
