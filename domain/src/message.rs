//! Raw messages as exported from the support channel, and the CSV loader.

use crate::error::{DomainErrorKind, Error, IngestErrorKind, InternalErrorKind};
use chrono::{DateTime, NaiveDateTime};
use log::*;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;
use utoipa::ToSchema;

/// `Tue Oct 31 22:10:47 +0000 2017`
const ZONED_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";
/// `Tue Oct 31 22:10:47 2017`
const NAIVE_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// One message of a support conversation. Column names follow the export format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawMessage {
    #[serde(rename = "tweet_id", deserialize_with = "deserialize_id")]
    pub message_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub author_id: String,
    /// `true` when the customer wrote the message, `false` for the agent.
    #[serde(deserialize_with = "deserialize_flag")]
    pub inbound: bool,
    pub created_at: String,
    pub text: String,
    #[serde(
        rename = "in_response_to_tweet_id",
        default,
        deserialize_with = "deserialize_optional_id"
    )]
    pub parent_id: Option<String>,
}

impl RawMessage {
    pub fn is_outbound(&self) -> bool {
        !self.inbound
    }

    pub fn timestamp(&self) -> Result<NaiveDateTime, Error> {
        parse_timestamp(&self.created_at)
    }
}

/// Parses a message timestamp, keeping the wall-clock time and discarding any zone offset.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, Error> {
    let value = value.trim();
    DateTime::parse_from_str(value, ZONED_TIMESTAMP_FORMAT)
        .map(|timestamp| timestamp.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(value, NAIVE_TIMESTAMP_FORMAT))
        .map_err(|err| {
            warn!("Unparseable message timestamp {value:?}: {err}");
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Ingest(
                    IngestErrorKind::Timestamp(value.to_string()),
                )),
            }
        })
}

/// One CSV row with every cell kept as text. The csv deserializer infers
/// numbers for untyped fields, which would reformat ids such as `007` or
/// round 19-digit ids through f64.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    tweet_id: String,
    author_id: String,
    inbound: String,
    created_at: String,
    text: String,
    #[serde(default)]
    in_response_to_tweet_id: Option<String>,
}

impl TryFrom<CsvRecord> for RawMessage {
    type Error = Error;

    fn try_from(record: CsvRecord) -> Result<Self, Self::Error> {
        let message_id = required_id(&record.tweet_id, "tweet_id")?;
        let author_id = required_id(&record.author_id, "author_id")?;
        let inbound = parse_flag(&record.inbound).ok_or_else(|| {
            warn!("Message {message_id} has an unknown inbound flag {:?}", record.inbound);
            Error::ingest(IngestErrorKind::Csv)
        })?;
        let parent_id = record
            .in_response_to_tweet_id
            .as_deref()
            .map(normalize_id)
            .filter(|id| !id.is_empty());

        Ok(RawMessage {
            message_id,
            author_id,
            inbound,
            created_at: record.created_at,
            text: record.text,
            parent_id,
        })
    }
}

fn required_id(raw: &str, column: &str) -> Result<String, Error> {
    let id = normalize_id(raw);
    if id.is_empty() {
        warn!("Row without a {column}");
        return Err(Error::ingest(IngestErrorKind::Csv));
    }
    Ok(id)
}

/// Reads every message from a CSV source with a header row. Unknown columns are ignored.
pub fn load_messages<R: io::Read>(reader: R) -> Result<Vec<RawMessage>, Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let messages = csv_reader
        .deserialize::<CsvRecord>()
        .map(|record| RawMessage::try_from(record?))
        .collect::<Result<Vec<_>, Error>>()?;

    debug!("Loaded {} raw messages", messages.len());
    Ok(messages)
}

pub fn load_messages_from_path(path: &Path) -> Result<Vec<RawMessage>, Error> {
    info!("Reading messages from {}", path.display());
    let file = std::fs::File::open(path).map_err(|err| {
        error!("Failed to open {}: {err}", path.display());
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Ingest(IngestErrorKind::Csv)),
        }
    })?;
    load_messages(io::BufReader::new(file))
}

// Spreadsheet exports write integer ids as floats ("119237.0").
fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(".0")
        .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(trimmed)
        .to_string()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

// JSON request bodies may carry ids as numbers or strings.
struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = Option<String>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a message or author identifier")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        let id = normalize_id(value);
        Ok((!id.is_empty()).then_some(id))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value.is_nan() {
            Ok(None)
        } else if value.fract() == 0.0 {
            Ok(Some(format!("{value:.0}")))
        } else {
            Ok(Some(value.to_string()))
        }
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(IdVisitor)
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer
        .deserialize_any(IdVisitor)?
        .ok_or_else(|| de::Error::custom("identifier must not be empty"))
}

fn deserialize_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    deserializer.deserialize_any(IdVisitor)
}

struct FlagVisitor;

impl Visitor<'_> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("true, false, 1 or 0")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
        match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(de::Error::invalid_value(de::Unexpected::Unsigned(value), &self)),
        }
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<bool, E> {
        match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(de::Error::invalid_value(de::Unexpected::Signed(value), &self)),
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
        parse_flag(value)
            .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Str(value), &self))
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    deserializer.deserialize_any(FlagVisitor)
}
